//! # drinks-api
//!
//! A coffee shop drink menu served over HTTP, with write access protected by
//! bearer tokens issued by an external identity provider.
//!
//! ## Modules
//!
//! - `oidc`: signing key set retrieval, token verification and the
//!   [`ResourceServer`] tying them together
//! - `auth`: permission checks, the `RequireAuthorization` layer and the
//!   authorization error taxonomy
//! - `drinks`: the drink resource (model, SQLite persistence, handlers)
//! - `app`: application state and routing

pub mod app;
pub mod auth;
pub mod axum_integration;
pub mod config;
pub mod drinks;
pub mod error;
pub mod oidc;

pub use error::{ApiError, Result};

pub use crate::app::{router, AppState};
pub use crate::auth::{AuthError, RequireAuthorization};
pub use crate::config::AppConfig;
pub use crate::oidc::types::{Claims, ResourceServerConfig, SigningKey, SigningKeySet};
pub use crate::oidc::ResourceServer;

#[cfg(test)]
mod test_support;
