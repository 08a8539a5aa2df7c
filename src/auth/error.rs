use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Coarse category of an [`AuthError`], used for logging and status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Header,
    Key,
    Signature,
    Claim,
    Permission,
}

/// Errors raised while authenticating a bearer token or authorizing a permission
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("Authorization header is missing")]
    NoHeader,

    /// Authorization header is not `Bearer <token>`
    #[error("Malformed header: expected 'Bearer <token>'")]
    MalformedHeader,

    /// Token header could not be decoded or carries no key id
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Signing key set could not be fetched or parsed
    #[error("Signing key set unavailable: {0}")]
    KeySetUnavailable(String),

    /// No published key matches the token's key id
    #[error("Unable to find appropriate key for kid '{0}'")]
    KeyNotFound(String),

    /// Matched key cannot be used for verification
    #[error("Unusable signing key: {0}")]
    UnusableKey(String),

    /// Token signed with an algorithm outside the accepted list
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Signature does not verify against the matched key
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `exp` is in the past
    #[error("Token expired")]
    TokenExpired,

    /// Audience, issuer or another registered claim failed validation
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    /// Token carries no `permissions` claim
    #[error("Permissions not included in token")]
    PermissionsClaimMissing,

    /// Required permission is not granted by the token
    #[error("Permission '{0}' not found")]
    PermissionDenied(String),
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::NoHeader | AuthError::MalformedHeader | AuthError::InvalidHeader(_) => {
                AuthErrorKind::Header
            }
            AuthError::KeySetUnavailable(_)
            | AuthError::KeyNotFound(_)
            | AuthError::UnusableKey(_) => AuthErrorKind::Key,
            AuthError::UnsupportedAlgorithm(_) | AuthError::InvalidSignature => {
                AuthErrorKind::Signature
            }
            AuthError::TokenExpired | AuthError::InvalidClaims(_) => AuthErrorKind::Claim,
            AuthError::PermissionsClaimMissing | AuthError::PermissionDenied(_) => {
                AuthErrorKind::Permission
            }
        }
    }

    /// 401 for every authentication failure, 405 for permission failures
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            AuthErrorKind::Permission => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message sent to the client. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            AuthErrorKind::Permission => "authorization failed",
            _ => "authentication failed",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_header_errors_are_unauthorized() {
        assert_eq!(AuthError::NoHeader.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MalformedHeader.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidHeader("no kid".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_verification_errors_are_unauthorized() {
        for err in [
            AuthError::KeySetUnavailable("timeout".to_string()),
            AuthError::KeyNotFound("abc".to_string()),
            AuthError::UnsupportedAlgorithm("HS256".to_string()),
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
            AuthError::InvalidClaims("aud".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err}");
            assert_eq!(err.public_message(), "authentication failed");
        }
    }

    #[test]
    fn test_permission_errors_are_method_not_allowed() {
        assert_eq!(
            AuthError::PermissionsClaimMissing.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AuthError::PermissionDenied("post:drinks".to_string()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(AuthError::MalformedHeader.kind(), AuthErrorKind::Header);
        assert_eq!(AuthError::KeyNotFound("k".to_string()).kind(), AuthErrorKind::Key);
        assert_eq!(AuthError::InvalidSignature.kind(), AuthErrorKind::Signature);
        assert_eq!(AuthError::TokenExpired.kind(), AuthErrorKind::Claim);
        assert_eq!(AuthError::PermissionsClaimMissing.kind(), AuthErrorKind::Permission);
    }

    #[test]
    fn test_malformed_header_message() {
        assert!(AuthError::MalformedHeader.to_string().contains("Malformed header"));
    }

    #[tokio::test]
    async fn test_response_body_hides_internal_detail() {
        let response = AuthError::KeyNotFound("secret-kid".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "authentication failed");
        assert!(!String::from_utf8_lossy(&bytes).contains("secret-kid"));
    }
}
