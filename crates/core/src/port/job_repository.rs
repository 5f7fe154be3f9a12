// Job Repository Port (Interface)

use crate::domain::{Job, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Job persistence (the task store)
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Persist status/progress/result/error of `job`.
    ///
    /// Conditional: only applies while the stored status is not terminal.
    /// Returns `false` when nothing was written (unknown id or already terminal).
    async fn record_outcome(&self, job: &Job) -> Result<bool>;

    /// Cheap connectivity check for health endpoints
    async fn ping(&self) -> Result<()>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory job store
    #[derive(Default)]
    pub struct InMemoryJobRepository {
        jobs: Mutex<HashMap<JobId, Job>>,
        fail_writes: Mutex<bool>,
    }

    impl InMemoryJobRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make inserts and outcome writes fail
        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        fn check_writable(&self) -> Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(crate::error::AppError::Database(
                    "database is locked".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl JobRepository for InMemoryJobRepository {
        async fn insert(&self, job: &Job) -> Result<()> {
            self.check_writable()?;
            self.jobs.lock().unwrap().insert(job.id.clone(), job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
            Ok(self.jobs.lock().unwrap().get(id).cloned())
        }

        async fn record_outcome(&self, job: &Job) -> Result<bool> {
            self.check_writable()?;
            let mut jobs = self.jobs.lock().unwrap();
            match jobs.get_mut(&job.id) {
                Some(stored) if !stored.status.is_terminal() => {
                    stored.status = job.status;
                    stored.progress = job.progress;
                    stored.result = job.result.clone();
                    stored.error = job.error.clone();
                    stored.updated_at = job.updated_at;
                    stored.finished_at = job.finished_at;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }
}
