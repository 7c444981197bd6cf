use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Reason surfaced when an unknown context or a bad client secret is presented.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Reason surfaced for every signature, format and timing failure.
pub const INVALID_TOKEN: &str = "Invalid token or expired token";

#[derive(Debug, Error)]
pub enum TaError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    InvalidJwk(String),

    #[error("Unknown context")]
    UnknownContext,

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Key material unavailable: {0}")]
    KeyMaterialUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Internal server error")]
    Internal,
}

impl TaError {
    pub fn invalid_credentials(reason: &str) -> Self {
        TaError::InvalidCredentials(reason.to_string())
    }

    /// HTTP status the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            TaError::InvalidCredentials(_) | TaError::UnknownContext => StatusCode::UNAUTHORIZED,
            TaError::InvalidJwk(_) | TaError::UnsupportedOperation(_) => StatusCode::NOT_FOUND,
            TaError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TaError::KeyMaterialUnavailable(_) | TaError::Crypto(_) | TaError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for TaError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            TaError::InvalidCredentials(reason) => ("INVALID_CREDENTIALS", reason.clone()),
            TaError::UnknownContext => ("INVALID_CREDENTIALS", INVALID_CREDENTIALS.to_string()),
            TaError::InvalidJwk(reason) => ("INVALID_JWK", reason.clone()),
            TaError::InvalidRequest(reason) => ("INVALID_REQUEST", reason.clone()),
            TaError::UnsupportedOperation(_) => {
                ("NOT_FOUND", "The requested resource is not available".to_string())
            }
            TaError::KeyMaterialUnavailable(detail) | TaError::Crypto(detail) => {
                tracing::error!(target: "ta.errors", error = %detail, "Request failed with internal error");
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
            TaError::Internal => ("INTERNAL_ERROR", "An internal error occurred".to_string()),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
