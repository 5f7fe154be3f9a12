//! SDK Error Types

use thiserror::Error;

/// SDK Result type
pub type Result<T> = std::result::Result<T, SdkError>;

/// SDK Error
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Non-2xx response; `code` and `details` come from the JSON error body
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Job {task_id} failed: {message}")]
    JobFailed { task_id: String, message: String },

    #[error("Job {task_id} still running after {attempts} polls")]
    Timeout { task_id: String, attempts: u32 },
}

impl SdkError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, SdkError::Api { status, .. } if (400..500).contains(status))
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            SdkError::Connection(e.to_string())
        } else if e.is_builder() {
            SdkError::InvalidUrl(e.to_string())
        } else {
            SdkError::Transport(e.to_string())
        }
    }
}
