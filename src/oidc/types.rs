//! Common types for token verification

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// `aud` may be a single string or a list of strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    /// Check whether the audience contains `value`
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == value,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == value),
        }
    }
}

/// Decoded token claims
///
/// A value of this type is only ever produced by the token verifier, after
/// signature, expiry, audience and issuer have been checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: Audience,
    /// Expiration time
    pub exp: i64,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Granted permission strings, e.g. `post:drinks`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    /// Additional custom claims
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// A single published signing key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key ID
    pub kid: String,
    /// Key type (e.g. "RSA")
    pub kty: String,
    /// Key usage (e.g. "sig")
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Algorithm hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

/// Signing key set as published at `/.well-known/jwks.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigningKeySet {
    pub keys: Vec<SigningKey>,
}

impl SigningKeySet {
    /// Find a key by its key id
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }
}

/// Resource server configuration
#[derive(Debug, Clone)]
pub struct ResourceServerConfig {
    /// Where the signing key set is published
    pub jwks_url: String,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Accepted signing algorithms
    pub algorithms: Vec<jsonwebtoken::Algorithm>,
    /// How long a fetched key set is reused; zero re-fetches on every request
    pub jwks_cache_ttl: Duration,
    /// Minimum age of the cached key set before an unknown key id triggers a
    /// refetch
    pub jwks_min_refresh_interval: Duration,
    /// Timeout for the key set request
    pub http_timeout: Duration,
}

impl ResourceServerConfig {
    /// Build a configuration for an identity provider domain, using the
    /// well-known key set location and `https://{domain}/` as issuer
    pub fn for_domain(domain: &str, audience: &str) -> Self {
        Self {
            jwks_url: format!("https://{}/.well-known/jwks.json", domain),
            issuer: format!("https://{}/", domain),
            audience: audience.to_string(),
            algorithms: vec![jsonwebtoken::Algorithm::RS256],
            jwks_cache_ttl: Duration::from_secs(300),
            jwks_min_refresh_interval: Duration::from_secs(30),
            http_timeout: Duration::from_secs(5),
        }
    }
}
