// Port Layer - Interfaces for external dependencies

pub mod analysis_repository;
pub mod job_repository;
pub mod time_provider;
pub mod worker_queue;

// Re-exports
pub use analysis_repository::AnalysisRepository;
pub use job_repository::JobRepository;
pub use time_provider::TimeProvider;
pub use worker_queue::{WorkerError, WorkerQueue};
