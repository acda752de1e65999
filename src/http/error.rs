use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::errors::LendingError;

/// fallback body for failures that are not the caller's fault
pub const UNEXPECTED: &str = "An unexpected error occurred";

/// lending error plus the message shown when it maps to a 500
#[derive(Debug)]
pub struct ApiError {
    pub error: LendingError,
    pub fallback: &'static str,
}

impl ApiError {
    pub fn new(error: LendingError, fallback: &'static str) -> Self {
        Self { error, fallback }
    }

    /// `map_err` adapter carrying an endpoint-specific fallback message
    pub fn or(fallback: &'static str) -> impl FnOnce(LendingError) -> Self {
        move |error| Self::new(error, fallback)
    }

    pub fn status(&self) -> StatusCode {
        match &self.error {
            LendingError::Validation { .. } => StatusCode::BAD_REQUEST,
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.error {
            LendingError::Validation { field, .. } => format!("Invalid {field} provided"),
            LendingError::CustomerNotFound { .. } => "Customer not found".to_string(),
            LendingError::LoanNotFound { .. } => "Loan not found".to_string(),
            LendingError::CustomerLoanNotFound { .. } => "Loan not found for the customer".to_string(),
            _ => self.fallback.to_string(),
        }
    }
}

impl From<LendingError> for ApiError {
    fn from(error: LendingError) -> Self {
        Self::new(error, UNEXPECTED)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, "{}", self.fallback);
        } else {
            tracing::debug!(error = %self.error, %status, "request refused");
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
