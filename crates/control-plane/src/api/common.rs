// Common DTOs for public API
//
// These types are shared across multiple API endpoints.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rsvp_core::EventError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Convert to axum response tuple
    pub fn into_response(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

/// Response wrapper for list endpoints.
/// All list endpoints return responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Plain acknowledgement for operations without a resource body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Event deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Handler error: a domain error rendered as `{"error": ...}` with its status.
#[derive(Debug)]
pub struct ApiError(pub EventError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EventError::InvalidInput(_)
            | EventError::CapacityExhausted(_)
            | EventError::DuplicateRsvp { .. } => StatusCode::BAD_REQUEST,
            EventError::NotFound(_) => StatusCode::NOT_FOUND,
            EventError::Forbidden(_) => StatusCode::FORBIDDEN,
            EventError::AlreadyExists(_) => StatusCode::CONFLICT,
            EventError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(EventError::invalid_input(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            tracing::error!("Request failed: {:#}", self.0);
            "Internal server error".to_string()
        };
        ErrorResponse::new(message).into_response(status).into_response()
    }
}

/// Parse a path id. Anything that is not a UUID cannot name a stored entity.
pub fn parse_path_id(raw: &str, entity: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError(EventError::not_found(entity)))
}
