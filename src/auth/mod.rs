//! Authorization helpers and middleware for permission verification
//!
//! # Features
//!
//! - Permission checks on verified [`Claims`]
//! - `RequireAuthorization` middleware layer protecting routes with a permission
//! - [`AuthError`] taxonomy, collapsed to 401 or 405 at the response boundary
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::post, Router};
//!
//! let app = Router::new()
//!     .route("/drinks", post(create_drink))
//!     .route_layer(resource_server.require("post:drinks"));
//! ```

pub mod claims;
pub mod error;
pub mod middleware;

pub use claims::check_permission;
pub use error::{AuthError, AuthErrorKind};
pub use middleware::RequireAuthorization;

pub use crate::oidc::types::Claims;
