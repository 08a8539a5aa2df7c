//! Resource server: authenticates bearer tokens and authorizes permissions

use axum::http::HeaderMap;

use super::jwks::KeySetFetcher;
use super::types::{Claims, ResourceServerConfig};
use super::verifier::TokenVerifier;
use crate::auth::claims::check_permission;
use crate::auth::{AuthError, RequireAuthorization};
use crate::axum_integration::extract_bearer_token;
use crate::error::Result;

/// Orchestrates key set retrieval, token verification and permission checks
#[derive(Debug, Clone)]
pub struct ResourceServer {
    fetcher: KeySetFetcher,
    verifier: TokenVerifier,
}

impl ResourceServer {
    /// Create a resource server from its configuration
    pub fn new(config: &ResourceServerConfig) -> Result<Self> {
        let fetcher = KeySetFetcher::new(&config.jwks_url, config.jwks_cache_ttl, config.http_timeout)?
            .with_min_refresh_interval(config.jwks_min_refresh_interval);
        let verifier = TokenVerifier::new(&config.audience, &config.issuer, config.algorithms.clone());
        Ok(Self { fetcher, verifier })
    }

    pub fn fetcher(&self) -> &KeySetFetcher {
        &self.fetcher
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Verify a bearer token against the current key set
    ///
    /// When the token's key id is missing from a cached key set, the set is
    /// fetched again once so a rotation at the identity provider is picked up.
    /// Sets younger than the minimum refresh interval are not refetched.
    pub async fn authenticate_token(&self, token: &str) -> std::result::Result<Claims, AuthError> {
        let snapshot = self.fetcher.key_set().await?;

        match self.verifier.verify(token, &snapshot.keys) {
            Err(AuthError::KeyNotFound(kid)) if snapshot.from_cache => {
                match self.fetcher.refresh(snapshot.fetched_at).await? {
                    Some(refreshed) => {
                        tracing::debug!("kid {} not in cached key set, retrying with refreshed set", kid);
                        self.verifier.verify(token, &refreshed.keys)
                    }
                    None => Err(AuthError::KeyNotFound(kid)),
                }
            }
            result => result,
        }
    }

    /// Extract and verify the bearer token carried by `headers`
    pub async fn authenticate(&self, headers: &HeaderMap) -> std::result::Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        self.authenticate_token(&token).await
    }

    /// Authenticate the request and check that it grants `permission`
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> std::result::Result<Claims, AuthError> {
        let claims = self.authenticate(headers).await?;
        check_permission(permission, &claims)?;
        Ok(claims)
    }

    /// Layer protecting a route with `permission`
    pub fn require(&self, permission: &str) -> RequireAuthorization {
        RequireAuthorization::new(self.clone(), permission)
    }
}
