//! Shared fixtures for unit tests: an RSA signing key published under
//! [`TEST_KID`] and helpers that mint tokens with it

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use crate::oidc::types::{SigningKey, SigningKeySet};

pub const TEST_KID: &str = "test-key-1";
pub const TEST_DOMAIN: &str = "coffee-shop.test";
pub const TEST_ISSUER: &str = "https://coffee-shop.test/";
pub const TEST_AUDIENCE: &str = "coffee";
pub const TEST_SUBJECT: &str = "auth0|barista";

const PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/rsa_private.pem");
const OTHER_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/rsa_other_private.pem");
const MODULUS: &str = include_str!("../tests/fixtures/rsa_modulus.txt");

pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Key set publishing the public half of the test key
pub fn signing_key_set() -> SigningKeySet {
    SigningKeySet {
        keys: vec![SigningKey {
            kid: TEST_KID.to_string(),
            kty: "RSA".to_string(),
            usage: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
            n: Some(MODULUS.trim().to_string()),
            e: Some("AQAB".to_string()),
        }],
    }
}

pub fn jwks_json() -> Value {
    serde_json::to_value(signing_key_set()).unwrap()
}

/// Claims accepted by a verifier for [`TEST_AUDIENCE`] and [`TEST_ISSUER`]
pub fn valid_claims(permissions: Option<&[&str]>) -> Value {
    let mut claims = json!({
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "sub": TEST_SUBJECT,
        "iat": now(),
        "exp": now() + 3600,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

fn sign(header: Header, claims: &Value, pem: &str) -> String {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

fn header(alg: Algorithm, kid: Option<&str>) -> Header {
    Header {
        kid: kid.map(str::to_string),
        ..Header::new(alg)
    }
}

pub fn mint(claims: Value) -> String {
    sign(header(Algorithm::RS256, Some(TEST_KID)), &claims, PRIVATE_KEY_PEM)
}

pub fn mint_with_kid(claims: Value, kid: &str) -> String {
    sign(header(Algorithm::RS256, Some(kid)), &claims, PRIVATE_KEY_PEM)
}

pub fn mint_without_kid(claims: Value) -> String {
    sign(header(Algorithm::RS256, None), &claims, PRIVATE_KEY_PEM)
}

pub fn mint_with_algorithm(claims: Value, alg: Algorithm) -> String {
    sign(header(alg, Some(TEST_KID)), &claims, PRIVATE_KEY_PEM)
}

/// Signed by a key that is not published, under the published key id
pub fn mint_with_foreign_key(claims: Value) -> String {
    sign(header(Algorithm::RS256, Some(TEST_KID)), &claims, OTHER_PRIVATE_KEY_PEM)
}
