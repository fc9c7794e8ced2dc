//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                                │
//! │  Result<Json<T>, ApiError>                                              │
//! │         │                                                               │
//! │         ├── StoreError::Unavailable ──► 503 DATABASE_UNAVAILABLE        │
//! │         ├── StoreError::Query ────────► 500 DATABASE_ERROR (logged)     │
//! │         ├── StoreError::Conflict ─────► 409 CONFLICT                    │
//! │         ├── CoreError::InvalidSortOrder ► 400 VALIDATION_ERROR          │
//! │         ▼                                                               │
//! │  { "code": "CONFLICT", "message": "State changed in another ..." }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Informational scan results are NOT errors; they come back as 200 with
//! the outcome in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use loantrack_core::CoreError;
use loantrack_engine::StoreError;
use serde::Serialize;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Unknown sort order 'sideways', expected 'newest' or 'oldest'"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Write lost a race with another session (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Database unreachable (503)
    DatabaseUnavailable,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(e) => {
                tracing::error!("Store unavailable: {}", e);
                ApiError::new(ErrorCode::DatabaseUnavailable, "Database unavailable")
            }
            StoreError::Query(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Store query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            StoreError::Conflict(e) => {
                tracing::warn!("Conflicting write: {}", e);
                ApiError::new(ErrorCode::Conflict, "State changed in another session, try again")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSortOrder(_) => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        let err = ApiError::from(StoreError::Unavailable("closed".into()));
        assert_eq!(err.code.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(StoreError::Query("syntax error near SELECT".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        // Details stay in the log
        assert!(!err.message.contains("syntax"));

        let err = ApiError::from(StoreError::Conflict("race".into()));
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_serializes_screaming_code() {
        let err = ApiError::from(CoreError::InvalidSortOrder("sideways".into()));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["message"].as_str().unwrap().contains("sideways"));
    }
}
