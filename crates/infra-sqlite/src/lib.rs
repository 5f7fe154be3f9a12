// Reportflow Infrastructure - SQLite Adapter
// Implements: JobRepository (task store), AnalysisRepository (analysis records)

mod analysis_repository;
mod connection;
mod error;
mod job_repository;
mod migration;

pub use analysis_repository::SqliteAnalysisRepository;
pub use connection::{create_pool, create_pool_with_max, health_check, DEFAULT_MAX_CONNECTIONS};
pub use job_repository::SqliteJobRepository;
pub use migration::run_migrations;
