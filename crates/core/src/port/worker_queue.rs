// Worker Queue Port
// Abstraction over the external service that runs PDF renders and AI analyses

use crate::domain::{JobId, JobKind, JobSnapshot};
use async_trait::async_trait;
use thiserror::Error;

/// Worker queue errors
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker unreachable: {0}")]
    Unreachable(String),

    #[error("Worker rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed worker response: {0}")]
    Malformed(String),

    #[error("Job {job_id} is not completed (status: {status})")]
    NotCompleted { job_id: JobId, status: String },

    #[error("Job {job_id} failed: {message}")]
    JobFailed { job_id: JobId, message: String },
}

/// Worker Queue trait
///
/// Implementations:
/// - FalQueueClient: fal-style queue REST API over HTTP
/// - FakeWorkerQueue: in-memory, for tests
#[async_trait]
pub trait WorkerQueue: Send + Sync {
    /// Enqueue work and return the identifier minted by the worker
    async fn submit(&self, kind: JobKind, input: &serde_json::Value) -> Result<JobId, WorkerError>;

    /// Current status of a job. Must not change job state.
    async fn status(&self, kind: JobKind, job_id: &str) -> Result<JobSnapshot, WorkerError>;

    /// Raw final payload of a completed job
    async fn result(&self, kind: JobKind, job_id: &str) -> Result<serde_json::Value, WorkerError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::JobStatus;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct FakeJob {
        kind: JobKind,
        input: serde_json::Value,
        status: JobStatus,
        progress: Option<u8>,
        result: Option<serde_json::Value>,
        error: Option<String>,
    }

    /// In-memory worker queue whose jobs are driven by the test
    pub struct FakeWorkerQueue {
        jobs: Mutex<HashMap<JobId, FakeJob>>,
        next_id: AtomicUsize,
        calls: AtomicUsize,
        unreachable: Mutex<bool>,
    }

    impl Default for FakeWorkerQueue {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeWorkerQueue {
        pub fn new() -> Self {
            Self {
                jobs: Mutex::new(HashMap::new()),
                next_id: AtomicUsize::new(1),
                calls: AtomicUsize::new(0),
                unreachable: Mutex::new(false),
            }
        }

        /// Total number of submit/status/result calls received
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Make every subsequent call fail as if the network were down
        pub fn set_unreachable(&self, unreachable: bool) {
            *self.unreachable.lock().unwrap() = unreachable;
        }

        /// Register a job that was submitted outside this fake
        pub fn insert_job(&self, job_id: impl Into<String>, kind: JobKind) {
            self.jobs.lock().unwrap().insert(
                job_id.into(),
                FakeJob {
                    kind,
                    input: serde_json::Value::Null,
                    status: JobStatus::Queued,
                    progress: Some(0),
                    result: None,
                    error: None,
                },
            );
        }

        pub fn set_processing(&self, job_id: &str, progress: u8) {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(job_id) {
                job.status = JobStatus::Processing;
                job.progress = Some(progress);
            }
        }

        pub fn complete(&self, job_id: &str, result: serde_json::Value) {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(job_id) {
                job.status = JobStatus::Completed;
                job.progress = Some(100);
                job.result = Some(result);
            }
        }

        pub fn fail(&self, job_id: &str, error: impl Into<String>) {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(job_id) {
                job.status = JobStatus::Failed;
                job.error = Some(error.into());
            }
        }

        /// Input the job was submitted with
        pub fn input_of(&self, job_id: &str) -> Option<serde_json::Value> {
            self.jobs
                .lock()
                .unwrap()
                .get(job_id)
                .map(|job| job.input.clone())
        }

        fn enter(&self) -> Result<(), WorkerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.unreachable.lock().unwrap() {
                return Err(WorkerError::Unreachable("connection refused".to_string()));
            }
            Ok(())
        }

        fn lookup(&self, kind: JobKind, job_id: &str) -> Result<FakeJob, WorkerError> {
            match self.jobs.lock().unwrap().get(job_id) {
                Some(job) if job.kind == kind => Ok(job.clone()),
                _ => Err(WorkerError::Rejected {
                    status: 404,
                    body: format!("Request {} not found", job_id),
                }),
            }
        }
    }

    #[async_trait]
    impl WorkerQueue for FakeWorkerQueue {
        async fn submit(
            &self,
            kind: JobKind,
            input: &serde_json::Value,
        ) -> Result<JobId, WorkerError> {
            self.enter()?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            let job_id = format!("{}-req-{}", kind, n);
            self.insert_job(job_id.clone(), kind);
            if let Some(job) = self.jobs.lock().unwrap().get_mut(&job_id) {
                job.input = input.clone();
            }
            Ok(job_id)
        }

        async fn status(&self, kind: JobKind, job_id: &str) -> Result<JobSnapshot, WorkerError> {
            self.enter()?;
            let job = self.lookup(kind, job_id)?;
            Ok(JobSnapshot {
                status: job.status,
                progress: job.progress,
                result: job.result,
                error: job.error,
            })
        }

        async fn result(
            &self,
            kind: JobKind,
            job_id: &str,
        ) -> Result<serde_json::Value, WorkerError> {
            self.enter()?;
            let job = self.lookup(kind, job_id)?;
            match (job.status, job.result) {
                (JobStatus::Completed, Some(result)) => Ok(result),
                (JobStatus::Failed, _) => Err(WorkerError::JobFailed {
                    job_id: job_id.to_string(),
                    message: job.error.unwrap_or_default(),
                }),
                (status, _) => Err(WorkerError::NotCompleted {
                    job_id: job_id.to_string(),
                    status: status.to_string(),
                }),
            }
        }
    }
}
