//! Error types for the HTTP layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use murmur_hub::EditError;
use murmur_store::StoreError;
use murmur_types::RejectReason;

/// Errors that can occur while serving an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The submitted message was refused.
    #[error("{0}")]
    Rejected(#[from] RejectReason),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The message store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The page template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl From<EditError> for ApiError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::Rejected(reason) => Self::Rejected(reason),
            EditError::NotFound(id) => Self::NotFound(format!("message {id}")),
            EditError::Store(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
