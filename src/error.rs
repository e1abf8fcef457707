//! Error types for arkchat.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for arkchat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for arkchat.
///
/// Every variant is surfaced to HTTP callers as `{"detail": <message>}`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upstream credential was not configured at startup.
    #[error("{0}")]
    Configuration(String),

    /// The completion provider failed; holds the provider's raw error text.
    #[error("{0}")]
    Upstream(String),

    /// The request body was malformed or carried an unknown role.
    #[error("{0}")]
    Validation(String),

    /// The request was refused before its body was read (wrong content
    /// type, oversized body); carries the extractor's own status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Rejected { status, .. } => *status,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
