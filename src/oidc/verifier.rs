//! Bearer token verification against a published signing key set

use std::str::FromStr;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, decode_header, get_current_timestamp, Algorithm, DecodingKey, Validation};

use super::types::{Claims, SigningKey, SigningKeySet};
use crate::auth::AuthError;

/// Registered claims every accepted token must carry
const REQUIRED_CLAIMS: [&str; 3] = ["exp", "aud", "iss"];

/// Build an RSA decoding key from a published signing key
pub fn decoding_key(key: &SigningKey) -> Result<DecodingKey, AuthError> {
    if key.kty != "RSA" {
        return Err(AuthError::UnusableKey(format!(
            "key '{}' has unsupported type {}",
            key.kid, key.kty
        )));
    }
    if let Some(usage) = key.usage.as_deref() {
        if usage != "sig" {
            return Err(AuthError::UnusableKey(format!(
                "key '{}' is not a signing key (use={})",
                key.kid, usage
            )));
        }
    }

    let (n, e) = match (key.n.as_deref(), key.e.as_deref()) {
        (Some(n), Some(e)) => (n, e),
        _ => {
            return Err(AuthError::UnusableKey(format!(
                "key '{}' is missing its modulus or exponent",
                key.kid
            )))
        }
    };

    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| AuthError::UnusableKey(format!("key '{}': {}", key.kid, e)))
}

fn map_decode_error(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience => AuthError::InvalidClaims("audience mismatch".to_string()),
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("issuer mismatch".to_string()),
        ErrorKind::ImmatureSignature => {
            AuthError::InvalidClaims("token is not valid yet".to_string())
        }
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing required claim '{}'", claim))
        }
        ErrorKind::Json(e) => AuthError::InvalidClaims(format!("malformed claims: {}", e)),
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AuthError::UnsupportedAlgorithm("algorithm not accepted for this key".to_string())
        }
        ErrorKind::InvalidRsaKey(msg) => AuthError::UnusableKey(msg.to_string()),
        ErrorKind::InvalidKeyFormat => AuthError::UnusableKey("invalid key format".to_string()),
        _ => AuthError::InvalidHeader(format!("unable to parse auth token: {}", err)),
    }
}

/// Verifies signature, expiry, audience and issuer of bearer tokens
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
}

impl TokenVerifier {
    pub fn new(audience: &str, issuer: &str, algorithms: Vec<Algorithm>) -> Self {
        Self {
            audience: audience.to_string(),
            issuer: issuer.to_string(),
            algorithms,
        }
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify `token` against `keys` and return its claims
    pub fn verify(&self, token: &str, keys: &SigningKeySet) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::InvalidHeader(format!("unable to decode token header: {}", e)))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidHeader("token header has no kid".to_string()))?;

        let key = keys
            .find(&kid)
            .ok_or_else(|| AuthError::KeyNotFound(kid.clone()))?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        if let Some(key_alg) = key.alg.as_deref() {
            if Algorithm::from_str(key_alg).ok() != Some(header.alg) {
                return Err(AuthError::UnusableKey(format!(
                    "key '{}' is published for {}, token is signed with {:?}",
                    kid, key_alg, header.alg
                )));
            }
        }

        let decoding_key = decoding_key(key)?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = self.algorithms.clone();
        validation.leeway = 0;
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS[..]);

        tracing::debug!("Validating token with kid: {}, algorithm: {:?}", kid, header.alg);

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(map_decode_error)?;

        // decode only rejects exp < now; a token expiring this second is spent
        if token_data.claims.exp <= get_current_timestamp() as i64 {
            return Err(AuthError::TokenExpired);
        }
        Ok(token_data.claims)
    }
}
