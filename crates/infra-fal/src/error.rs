// Worker adapter errors

use reportflow_core::port::WorkerError;

/// Errors from the worker queue REST layer
#[derive(Debug, thiserror::Error)]
pub enum FalError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The queue returned a non-2xx status code
    #[error("Worker queue error ({status}): {body}")]
    Api { status: u16, body: String },

    /// 2xx response whose body could not be understood
    #[error("Malformed worker response: {0}")]
    Malformed(String),

    /// Configured worker URL cannot be parsed or has no path
    #[error("Invalid worker URL: {0}")]
    InvalidUrl(String),

    /// Request id that cannot be used as a single URL path segment
    #[error("Invalid request id '{0}'")]
    InvalidRequestId(String),
}

impl From<FalError> for WorkerError {
    fn from(err: FalError) -> Self {
        match err {
            FalError::Request(e) if e.is_decode() => WorkerError::Malformed(e.to_string()),
            FalError::Request(e) => WorkerError::Unreachable(e.to_string()),
            FalError::Api { status, body } => WorkerError::Rejected { status, body },
            FalError::Malformed(msg) => WorkerError::Malformed(msg),
            FalError::InvalidUrl(msg) => WorkerError::Unreachable(msg),
            err @ FalError::InvalidRequestId(_) => WorkerError::Rejected {
                status: 400,
                body: err.to_string(),
            },
        }
    }
}
