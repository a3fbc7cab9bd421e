//! # Response Envelope
//!
//! Every response, success or failure, leaves the server in this shape:
//!
//! ```json
//! { "statusCode": 200, "success": true, "message": "...",
//!   "meta": {...}, "data": {...}, "errors": [...] }
//! ```
//!
//! Fields are private and the constructors keep `data` on the success side
//! and `errors` on the failure side.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::schema::ValidationError;
use crate::storage::PaginationMeta;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    status_code: u16,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ValidationError>>,
}

impl<T> ResponseEnvelope<T> {
    fn success(status: StatusCode, data: Option<T>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: true,
            message: None,
            meta: None,
            data,
            errors: None,
        }
    }

    /// 200 with a body
    pub fn ok(data: T) -> Self {
        Self::success(StatusCode::OK, Some(data))
    }

    /// 201 with the created resource
    pub fn created(data: T) -> Self {
        Self::success(StatusCode::CREATED, Some(data))
    }

    /// 200 with one page of results
    pub fn paginated(data: T, meta: PaginationMeta) -> Self {
        let mut envelope = Self::success(StatusCode::OK, Some(data));
        envelope.meta = Some(meta);
        envelope
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn meta(&self) -> Option<&PaginationMeta> {
        self.meta.as_ref()
    }

    pub fn errors(&self) -> Option<&[ValidationError]> {
        self.errors.as_deref()
    }
}

impl ResponseEnvelope<()> {
    /// 200 without a body (deletes)
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, None).with_message(message)
    }

    /// Error envelope; `errors` is only kept when non-empty
    pub fn failure(status: StatusCode, message: impl Into<String>, errors: Vec<ValidationError>) -> Self {
        Self {
            status_code: status.as_u16(),
            success: false,
            message: Some(message.into()),
            meta: None,
            data: None,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }
}

impl<T: Serialize> IntoResponse for ResponseEnvelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
