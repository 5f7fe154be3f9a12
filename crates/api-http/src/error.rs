//! HTTP Error Mapping
//!
//! Every failure leaves a handler as a JSON body `{error, code}` with a
//! non-2xx status. Server-side failures add `details`; a persistence failure
//! after a successful fetch also carries the fetched `result`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reportflow_core::domain::DomainError;
use reportflow_core::error::AppError;
use serde_json::json;

/// Error codes carried in the `code` field
pub mod code {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const EXTERNAL_SERVICE_ERROR: &str = "EXTERNAL_SERVICE_ERROR";
    pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Handler error: an [`AppError`] on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::Validation(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(AppError::Validation(format!(
            "Invalid query string: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            AppError::Validation(msg) | AppError::Domain(DomainError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                json!({"error": msg, "code": code::VALIDATION_ERROR}),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                json!({"error": msg, "code": code::NOT_FOUND}),
            ),
            AppError::ExternalService(err) => {
                tracing::warn!(error = %err, "Worker queue request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Worker queue request failed",
                        "code": code::EXTERNAL_SERVICE_ERROR,
                        "details": err.to_string(),
                    }),
                )
            }
            AppError::Persistence { message, result } => {
                tracing::error!(error = %message, "Result fetched but not persisted");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to save result",
                        "code": code::PERSISTENCE_ERROR,
                        "details": message,
                        "result": result,
                    }),
                )
            }
            other => {
                tracing::error!(error = %other, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Internal server error",
                        "code": code::INTERNAL_ERROR,
                        "details": other.to_string(),
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
