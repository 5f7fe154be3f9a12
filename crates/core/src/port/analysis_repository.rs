// Analysis Repository Port (Interface)

use crate::domain::{AnalysisRecord, JobKind, JobResult};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Analysis Records
#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    /// Insert a new record
    async fn insert(&self, record: &AnalysisRecord) -> Result<()>;

    /// Find record by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisRecord>>;

    /// Find the record whose `pdf_task_id` / `analysis_task_id` equals `task_id`
    async fn find_by_task_id(&self, kind: JobKind, task_id: &str)
        -> Result<Option<AnalysisRecord>>;

    /// Point the record at a freshly submitted job and mark that side `queued`.
    /// Returns `false` if no record has `analysis_id`.
    async fn attach_task(
        &self,
        analysis_id: &str,
        kind: JobKind,
        task_id: &str,
        now_millis: i64,
    ) -> Result<bool>;

    /// Write a completed result into the record matched by `task_id`.
    ///
    /// Compare-and-swap: only applies while that side's status is not terminal,
    /// so re-delivering the same job leaves the record untouched.
    /// Returns `false` when no row was written.
    async fn apply_result(&self, task_id: &str, result: &JobResult, now_millis: i64)
        -> Result<bool>;

    /// Mark the side matched by `task_id` as failed (same CAS rule as `apply_result`)
    async fn mark_failed(&self, kind: JobKind, task_id: &str, now_millis: i64) -> Result<bool>;
}

pub mod mocks {
    use super::*;
    use crate::domain::JobStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory analysis store with write counting
    #[derive(Default)]
    pub struct InMemoryAnalysisRepository {
        records: Mutex<Vec<AnalysisRecord>>,
        writes: AtomicUsize,
        fail_writes: Mutex<bool>,
    }

    impl InMemoryAnalysisRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of mutating calls that changed a row
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        fn check_writable(&self) -> Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(crate::error::AppError::Database(
                    "disk I/O error".to_string(),
                ));
            }
            Ok(())
        }

        fn update_where<F>(&self, pred: impl Fn(&AnalysisRecord) -> bool, apply: F) -> bool
        where
            F: FnOnce(&mut AnalysisRecord),
        {
            let mut records = self.records.lock().unwrap();
            match records.iter_mut().find(|r| pred(r)) {
                Some(record) => {
                    apply(record);
                    self.writes.fetch_add(1, Ordering::SeqCst);
                    true
                }
                None => false,
            }
        }
    }

    fn open(status: Option<JobStatus>) -> bool {
        !status.map(|s| s.is_terminal()).unwrap_or(false)
    }

    #[async_trait]
    impl AnalysisRepository for InMemoryAnalysisRepository {
        async fn insert(&self, record: &AnalysisRecord) -> Result<()> {
            self.check_writable()?;
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<AnalysisRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn find_by_task_id(
            &self,
            kind: JobKind,
            task_id: &str,
        ) -> Result<Option<AnalysisRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.task_id(kind) == Some(task_id))
                .cloned())
        }

        async fn attach_task(
            &self,
            analysis_id: &str,
            kind: JobKind,
            task_id: &str,
            now_millis: i64,
        ) -> Result<bool> {
            self.check_writable()?;
            Ok(self.update_where(
                |r| r.id == analysis_id,
                |r| {
                    match kind {
                        JobKind::Pdf => {
                            r.pdf_task_id = Some(task_id.to_string());
                            r.pdf_status = Some(JobStatus::Queued);
                        }
                        JobKind::Analysis => {
                            r.analysis_task_id = Some(task_id.to_string());
                            r.analysis_status = Some(JobStatus::Queued);
                        }
                    }
                    r.updated_at = now_millis;
                },
            ))
        }

        async fn apply_result(
            &self,
            task_id: &str,
            result: &JobResult,
            now_millis: i64,
        ) -> Result<bool> {
            self.check_writable()?;
            let kind = result.kind();
            Ok(self.update_where(
                |r| r.task_id(kind) == Some(task_id) && open(r.status_for(kind)),
                |r| {
                    match result {
                        JobResult::Pdf(output) => {
                            r.pdf_url = Some(output.pdf_url.clone());
                            r.pdf_status = Some(JobStatus::Completed);
                        }
                        JobResult::Analysis(output) => {
                            r.summary = Some(output.summary.clone());
                            r.insights = Some(output.insights.clone());
                            r.recommendations = Some(output.recommendations.clone());
                            r.analysis_status = Some(JobStatus::Completed);
                        }
                    }
                    r.updated_at = now_millis;
                },
            ))
        }

        async fn mark_failed(
            &self,
            kind: JobKind,
            task_id: &str,
            now_millis: i64,
        ) -> Result<bool> {
            self.check_writable()?;
            Ok(self.update_where(
                |r| r.task_id(kind) == Some(task_id) && open(r.status_for(kind)),
                |r| {
                    match kind {
                        JobKind::Pdf => r.pdf_status = Some(JobStatus::Failed),
                        JobKind::Analysis => r.analysis_status = Some(JobStatus::Failed),
                    }
                    r.updated_at = now_millis;
                },
            ))
        }
    }
}
