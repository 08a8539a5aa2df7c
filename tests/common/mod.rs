//! Test harness: a mock identity provider serving the fixture key set, an
//! in-memory database and token minting helpers

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drinks_api::drinks::{DrinkRepository, SqliteDrinkRepository};
use drinks_api::{router, AppState, ResourceServer, ResourceServerConfig};

pub const KID: &str = "test-key-1";
pub const DOMAIN: &str = "coffee-shop.test";
pub const ISSUER: &str = "https://coffee-shop.test/";
pub const AUDIENCE: &str = "coffee";

const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/rsa_private.pem");
const MODULUS: &str = include_str!("../fixtures/rsa_modulus.txt");

pub struct TestApp {
    pub app: Router,
    pub drinks: Arc<SqliteDrinkRepository>,
    pub idp: MockServer,
}

pub fn jwks() -> Value {
    json!({
        "keys": [{
            "kid": KID,
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "n": MODULUS.trim(),
            "e": "AQAB"
        }]
    })
}

impl TestApp {
    pub async fn spawn() -> Self {
        let idp = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks()))
            .mount(&idp)
            .await;
        Self::with_idp(idp).await
    }

    pub async fn with_idp(idp: MockServer) -> Self {
        let mut config = ResourceServerConfig::for_domain(DOMAIN, AUDIENCE);
        config.jwks_url = format!("{}/.well-known/jwks.json", idp.uri());
        config.jwks_cache_ttl = Duration::ZERO;
        config.http_timeout = Duration::from_secs(2);
        let resource_server = ResourceServer::new(&config).unwrap();

        let drinks = Arc::new(SqliteDrinkRepository::in_memory().await.unwrap());
        let repo: Arc<dyn DrinkRepository> = drinks.clone();
        let app = router(AppState::new(repo, resource_server));

        Self { app, drinks, idp }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub fn claims(permissions: Option<&[&str]>) -> Value {
    let mut claims = json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|manager",
        "iat": now(),
        "exp": now() + 3600,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

pub fn mint(claims: &Value) -> String {
    let header = Header {
        kid: Some(KID.to_string()),
        ..Header::new(Algorithm::RS256)
    };
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

pub fn manager_token() -> String {
    mint(&claims(Some(&[
        "get:drinks-detail",
        "post:drinks",
        "patch:drinks",
        "delete:drinks",
    ])))
}

pub fn barista_token() -> String {
    mint(&claims(Some(&["get:drinks-detail"])))
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn latte() -> Value {
    json!({
        "title": "Latte",
        "recipe": [
            {"name": "espresso", "color": "brown", "parts": 1},
            {"name": "milk", "color": "white", "parts": 3}
        ]
    })
}
