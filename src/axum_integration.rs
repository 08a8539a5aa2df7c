//! Axum integration for bearer token authorization
//!
//! - Bearer token extraction from the `Authorization` header
//! - `FromRequestParts` extractor handing verified [`Claims`] to handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use drinks_api::axum_integration::Authorized;
//!
//! async fn create_drink(Authorized(claims): Authorized) -> String {
//!     format!("granted: {:?}", claims.permissions)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::ops::Deref;

use crate::auth::AuthError;
use crate::oidc::types::Claims;

/// Extract the bearer token from the Authorization header
///
/// The header must hold exactly two space-separated parts, the first being
/// `bearer` in any letter case.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::NoHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.to_string())
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

/// Verified claims for the current request
///
/// Inserted into the request extensions by
/// [`RequireAuthorization`](crate::auth::RequireAuthorization); a handler using
/// this extractor on an unprotected route is rejected with 401.
#[derive(Debug, Clone)]
pub struct Authorized(pub Claims);

impl Deref for Authorized {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Claims> for Authorized {
    fn from(claims: Claims) -> Self {
        Self(claims)
    }
}

impl Authorized {
    pub fn into_inner(self) -> Claims {
        self.0
    }
}

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(Authorized)
            .ok_or(AuthError::NoHeader)
    }
}
