//! Error types for the drinks API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::drinks::repository::RepositoryError;

/// Crate-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => ApiError::NotFound,
            RepositoryError::Database(e) => ApiError::Unprocessable(e.to_string()),
            RepositoryError::Serialization(e) => ApiError::Serialization(e),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to clients; internal detail only goes to the logs
    fn public_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => format!("bad request: {}", msg),
            ApiError::NotFound => "resource not found".to_string(),
            ApiError::Unprocessable(_) => "unprocessable".to_string(),
            ApiError::Auth(e) => e.public_message().to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!("{}", self),
            StatusCode::UNPROCESSABLE_ENTITY => tracing::warn!("{}", self),
            _ => tracing::debug!("{}", self),
        }

        let body = json!({
            "success": false,
            "error": status.as_u16(),
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}
