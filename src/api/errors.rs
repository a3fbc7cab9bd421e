//! # Error Translation
//!
//! Every failure a handler or guard can produce ends up as an [`ApiError`],
//! and this is the only place that decides its status code and the message
//! the client sees.

use std::any::Any;

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::AuthError;
use crate::schema::{SchemaError, ValidationError};
use crate::storage::StorageError;

use super::response::ResponseEnvelope;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Message sent for every 5xx
pub const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Missing, malformed, invalid or expired credential (401)
    #[error("{0}")]
    Unauthenticated(AuthError),

    /// Valid credential, insufficient role (403)
    #[error("Forbidden: insufficient role")]
    Forbidden,

    /// Payload broke its schema (400)
    #[error("Validation failed")]
    ValidationFailed(Vec<ValidationError>),

    /// Referenced entity absent (404)
    #[error("{0}")]
    NotFound(String),

    /// Request is well-formed but breaks a domain rule (400)
    #[error("{0}")]
    Domain(String),

    /// Path exists, method does not (405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body exceeds the configured limit (413)
    #[error("Request body too large")]
    PayloadTooLarge,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Anything unclassified; the detail is logged, never sent
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl ToString) -> Self {
        Self::Internal(detail.to_string())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Domain(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message safe to show a client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Map this error onto the response envelope
    pub fn translate(&self) -> ResponseEnvelope<()> {
        let errors = match self {
            ApiError::ValidationFailed(errors) => errors.clone(),
            _ => Vec::new(),
        };
        ResponseEnvelope::failure(self.status_code(), self.public_message(), errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden => ApiError::Forbidden,
            e if e.is_unauthenticated() => ApiError::Unauthenticated(e),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            e @ StorageError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            StorageError::Conflict(msg) => ApiError::Domain(msg),
            e @ StorageError::Backend(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::ValidationFailed(errors)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            status if status.is_server_error() => ApiError::Internal(rejection.body_text()),
            _ => ApiError::ValidationFailed(vec![ValidationError::payload(
                "The request body could not be read.",
            )]),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        self.translate().into_response()
    }
}

/// Response for a handler that panicked
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

/// Router fallback for unmatched paths
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Method fallback for known paths
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
