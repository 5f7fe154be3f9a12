// Domain Layer - Pure business logic and entities

pub mod analysis;
pub mod error;
pub mod job;

// Re-exports
pub use analysis::{AnalysisRecord, FileMetadata};
pub use error::DomainError;
pub use job::{
    AnalysisOutput, Job, JobId, JobKind, JobResult, JobSnapshot, JobStatus, PdfOutput,
};
