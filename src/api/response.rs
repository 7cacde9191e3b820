//! Response types for the payroll API.
//!
//! This module defines the error response structures and maps every
//! [`EngineError`] to a stable error code and HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// Maps an engine error to its HTTP status.
///
/// Validation problems are 400, missing resources 404, lifecycle conflicts
/// 409, ledger refusals 422, and configuration or internal faults 500.
pub fn status_for(error: &EngineError) -> StatusCode {
    match error {
        EngineError::ConfigNotFound { .. }
        | EngineError::ConfigParseError { .. }
        | EngineError::InvalidConfig { .. }
        | EngineError::CollaboratorUnavailable { .. }
        | EngineError::CalculationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::EmployeeNotFound { .. } | EngineError::PayrollNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        EngineError::EmployeeInactive { .. }
        | EngineError::InvalidEmployee { .. }
        | EngineError::InvalidPeriod { .. }
        | EngineError::InvalidAttendance { .. } => StatusCode::BAD_REQUEST,
        EngineError::PayrollLocked { .. } | EngineError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        EngineError::LedgerRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = status_for(&error);
        let code = error.code();
        let api_error = match &error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => {
                ApiError::with_details(code, "Configuration error", error.to_string())
            }
            EngineError::CalculationError { message } => {
                ApiError::with_details(code, "Calculation failed", message.clone())
            }
            EngineError::PayrollLocked { .. } => ApiError::with_details(
                code,
                error.to_string(),
                "Approved and paid periods are frozen",
            ),
            EngineError::LedgerRejected { .. } => ApiError::with_details(
                code,
                error.to_string(),
                "The payroll record was left unpaid",
            ),
            _ => ApiError::new(code, error.to_string()),
        };
        ApiErrorResponse {
            status,
            error: api_error,
        }
    }
}
