//! API error types with HTTP response mapping.

use account_number::AccountNumberError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

impl ApiError {
    /// Returns the HTTP status for the wrapped error kind.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Argument { .. } => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::RateLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            DomainError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::error!(error = %self.0, "service unavailable");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "name": self.0.name(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<AccountNumberError> for ApiError {
    fn from(err: AccountNumberError) -> Self {
        ApiError(err.into())
    }
}
