//! Application state and route wiring

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::drinks::handlers;
use crate::drinks::DrinkRepository;
use crate::error::ApiError;
use crate::oidc::ResourceServer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkRepository>,
    pub resource_server: ResourceServer,
}

impl AppState {
    pub fn new(drinks: Arc<dyn DrinkRepository>, resource_server: ResourceServer) -> Self {
        Self {
            drinks,
            resource_server,
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}

/// Build the REST API router
pub fn router(state: AppState) -> Router {
    let rs = state.resource_server.clone();

    Router::new()
        .route("/drinks", get(handlers::list_drinks))
        .route(
            "/drinks",
            post(handlers::create_drink).route_layer(rs.require("post:drinks")),
        )
        .route(
            "/drinks-detail",
            get(handlers::drinks_detail).route_layer(rs.require("get:drinks-detail")),
        )
        .route(
            "/drinks/{id}",
            patch(handlers::update_drink).route_layer(rs.require("patch:drinks")),
        )
        .route(
            "/drinks/{id}",
            delete(handlers::delete_drink).route_layer(rs.require("delete:drinks")),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}
