// Central Error Type for the Application

use crate::domain::{DomainError, JobResult};
use crate::port::WorkerError;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid caller-supplied parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Worker queue unreachable, returned malformed data, or the job is not done
    #[error("External service error: {0}")]
    ExternalService(#[from] WorkerError),

    /// Database write failed after the result was already fetched
    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        result: Option<Box<JobResult>>,
    },

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a failed write, keeping the fetched result for the caller
    pub fn persistence(source: AppError, result: JobResult) -> Self {
        AppError::Persistence {
            message: source.to_string(),
            result: Some(Box::new(result)),
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::NotFound(_)
                | AppError::Domain(DomainError::ValidationError(_))
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
