// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Malformed worker payload: {0}")]
    MalformedPayload(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
