//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the HTTP handlers.
///
/// Responses carry only a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Store unreachable or a statement failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Request body could not be read as a posture record
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

impl ApiError {
    /// HTTP status reported for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage(e) => error!("Storage failure: {}", e),
            ApiError::MalformedRequest(msg) => warn!("Rejected request body: {}", msg),
        }
        self.status().into_response()
    }
}
