//! Token verification against an OIDC identity provider
//!
//! Fetches the provider's published signing keys, verifies bearer tokens with
//! them and ties both together in a [`ResourceServer`].

pub mod jwks;
pub mod resource_server;
pub mod types;
pub mod verifier;

pub use jwks::{KeySetFetcher, KeySetSnapshot};
pub use resource_server::ResourceServer;
pub use types::*;
pub use verifier::TokenVerifier;
