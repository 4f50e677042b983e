//! Error types and error handling for the backend.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
//! each error kind to a status code and the `{"success": false, "error": ...}`
//! envelope exactly once, at the boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::bridge::BridgeError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A required input is missing or malformed. Never forwarded downstream.
    #[error("{0}")]
    Validation(String),

    /// A referenced message or chat does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A message store query failed.
    #[error("message store query failed: {0}")]
    Store(#[from] rusqlite::Error),

    /// No store handle could be acquired from the pool.
    #[error("message store unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    /// The WhatsApp bridge could not be reached within the timeout.
    #[error("failed to connect to WhatsApp bridge: {0}")]
    BridgeUnavailable(String),

    /// The WhatsApp bridge answered with a non-success status. The remote
    /// status and body are propagated to the caller unchanged.
    #[error("WhatsApp bridge returned status {status}: {body}")]
    BridgeRejected { status: u16, body: String },
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Unreachable(msg) => ApiError::BridgeUnavailable(msg),
            BridgeError::InvalidResponse(msg) => {
                ApiError::BridgeUnavailable(format!("invalid response from bridge: {}", msg))
            }
            BridgeError::Rejected { status, body } => ApiError::BridgeRejected { status, body },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Pool(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BridgeUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::BridgeRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        };

        if status.is_server_error() {
            error!(target: "server", error = %self, "request failed");
        }

        (
            status,
            Json(json!({"success": false, "error": self.to_string()})),
        )
            .into_response()
    }
}
