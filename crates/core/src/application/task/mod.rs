// Task Service - submit / status / result use cases for worker jobs

pub mod materialize;
pub mod poll;
pub mod submit;


pub use materialize::MaterializedResult;
pub use poll::{TaskRef, TaskStatus};
pub use submit::{SubmitOutcome, SubmitRequest};

use crate::error::{AppError, Result};
use crate::port::{AnalysisRepository, JobRepository, TimeProvider, WorkerQueue};
use std::sync::Arc;

/// Reject missing or blank parameters with a message naming the wire field
pub(crate) fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
}

/// Task Service
pub struct TaskService {
    job_repo: Arc<dyn JobRepository>,
    analysis_repo: Arc<dyn AnalysisRepository>,
    worker: Arc<dyn WorkerQueue>,
    time_provider: Arc<dyn TimeProvider>,
}

impl TaskService {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        analysis_repo: Arc<dyn AnalysisRepository>,
        worker: Arc<dyn WorkerQueue>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            job_repo,
            analysis_repo,
            worker,
            time_provider,
        }
    }

    /// Submit a new job to the worker queue
    pub async fn submit(&self, req: SubmitRequest) -> Result<SubmitOutcome> {
        submit::execute(
            self.job_repo.as_ref(),
            self.analysis_repo.as_ref(),
            self.worker.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Report the worker's current view of a job
    pub async fn status(&self, task: TaskRef) -> Result<TaskStatus> {
        poll::execute(self.worker.as_ref(), task).await
    }

    /// Fetch a finished job's payload and write it back
    pub async fn result(&self, task: TaskRef) -> Result<MaterializedResult> {
        materialize::execute(
            self.job_repo.as_ref(),
            self.analysis_repo.as_ref(),
            self.worker.as_ref(),
            self.time_provider.as_ref(),
            task,
        )
        .await
    }

    /// Check the task store is reachable
    pub async fn health(&self) -> Result<()> {
        self.job_repo.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisRecord, FileMetadata, JobKind, JobResult, JobStatus};
    use crate::port::analysis_repository::mocks::InMemoryAnalysisRepository;
    use crate::port::job_repository::mocks::InMemoryJobRepository;
    use crate::port::time_provider::FixedTimeProvider;
    use crate::port::worker_queue::mocks::FakeWorkerQueue;
    use crate::port::WorkerError;
    use serde_json::json;

    struct Harness {
        jobs: Arc<InMemoryJobRepository>,
        analyses: Arc<InMemoryAnalysisRepository>,
        worker: Arc<FakeWorkerQueue>,
        service: TaskService,
    }

    fn harness() -> Harness {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let analyses = Arc::new(InMemoryAnalysisRepository::new());
        let worker = Arc::new(FakeWorkerQueue::new());
        let service = TaskService::new(
            jobs.clone(),
            analyses.clone(),
            worker.clone(),
            Arc::new(FixedTimeProvider::new(1_000)),
        );
        Harness {
            jobs,
            analyses,
            worker,
            service,
        }
    }

    async fn seed_record(h: &Harness, id: &str) {
        let record = AnalysisRecord::new(
            id,
            "user-1",
            FileMetadata {
                file_name: "sales.csv".to_string(),
                file_type: Some("text/csv".to_string()),
                file_size: Some(2048),
                file_url: Some("s3://uploads/sales.csv".to_string()),
            },
            500,
        );
        h.analyses.insert(&record).await.unwrap();
    }

    fn analysis_submit(analysis_id: Option<&str>) -> SubmitRequest {
        SubmitRequest {
            kind: Some("analysis".to_string()),
            input: Some(json!({"datasetUrl": "s3://uploads/sales.csv"})),
            analysis_id: analysis_id.map(str::to_string),
        }
    }

    fn analysis_payload() -> serde_json::Value {
        json!({
            "summary": "Revenue grew 12% quarter over quarter",
            "insights": ["Q3 was strongest"],
            "recommendations": ["Hire two account executives"]
        })
    }

    #[tokio::test]
    async fn test_submit_records_job_and_attaches_task() {
        let h = harness();
        seed_record(&h, "a-1").await;

        let outcome = h.service.submit(analysis_submit(Some("a-1"))).await.unwrap();
        assert_eq!(outcome.status, JobStatus::Queued);

        let job = h.jobs.find_by_id(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.kind, JobKind::Analysis);
        assert_eq!(job.analysis_id.as_deref(), Some("a-1"));

        let record = h.analyses.find_by_id("a-1").await.unwrap().unwrap();
        assert_eq!(record.analysis_task_id.as_deref(), Some(outcome.job_id.as_str()));
        assert_eq!(record.analysis_status, Some(JobStatus::Queued));
    }

    #[tokio::test]
    async fn test_submit_unknown_analysis_is_not_found_before_worker_call() {
        let h = harness();

        let err = h.service.submit(analysis_submit(Some("missing"))).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(h.worker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_status_and_result_require_both_params() {
        let h = harness();

        for task in [
            TaskRef {
                task_id: None,
                kind: Some("pdf".to_string()),
            },
            TaskRef {
                task_id: Some("t-1".to_string()),
                kind: None,
            },
            TaskRef::default(),
        ] {
            let err = h.service.status(task.clone()).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            let err = h.service.result(task).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        assert_eq!(h.worker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_task_id_must_be_a_single_path_segment() {
        let h = harness();

        for id in ["../../other-app", "t-1/status", "t-1?x=1", "t-1#a", "..", "a\\b"] {
            let task = TaskRef::new(id, JobKind::Pdf);
            let err = h.service.status(task.clone()).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{}", id);
            let err = h.service.result(task).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{}", id);
        }

        assert_eq!(h.worker.call_count(), 0);
    }

    #[tokio::test]
    async fn test_status_passes_worker_view_through_without_writes() {
        let h = harness();
        seed_record(&h, "a-1").await;
        let outcome = h.service.submit(analysis_submit(Some("a-1"))).await.unwrap();
        let writes_after_submit = h.analyses.write_count();

        h.worker.set_processing(&outcome.job_id, 40);
        for _ in 0..3 {
            let status = h
                .service
                .status(TaskRef::new(&outcome.job_id, JobKind::Analysis))
                .await
                .unwrap();
            assert_eq!(status.status, JobStatus::Processing);
            assert_eq!(status.progress, Some(40));
        }

        h.worker.complete(&outcome.job_id, analysis_payload());
        let status = h
            .service
            .status(TaskRef::new(&outcome.job_id, JobKind::Analysis))
            .await
            .unwrap();
        assert_eq!(status.status, JobStatus::Completed);
        assert!(status.result.is_some());

        assert_eq!(h.analyses.write_count(), writes_after_submit);
        let job = h.jobs.find_by_id(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn test_result_writes_record_once() {
        let h = harness();
        seed_record(&h, "a-1").await;
        let outcome = h.service.submit(analysis_submit(Some("a-1"))).await.unwrap();
        h.worker.complete(&outcome.job_id, analysis_payload());

        let task = TaskRef::new(&outcome.job_id, JobKind::Analysis);
        let first = h.service.result(task.clone()).await.unwrap();
        assert!(first.record_updated);
        let after_first = h.analyses.find_by_id("a-1").await.unwrap().unwrap();

        let second = h.service.result(task).await.unwrap();
        assert!(!second.record_updated);
        assert_eq!(first.result, second.result);
        let after_second = h.analyses.find_by_id("a-1").await.unwrap().unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.analysis_status, Some(JobStatus::Completed));
        assert_eq!(
            after_second.summary.as_deref(),
            Some("Revenue grew 12% quarter over quarter")
        );

        let job = h.jobs.find_by_id(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(matches!(job.result, Some(JobResult::Analysis(_))));
    }

    #[tokio::test]
    async fn test_result_without_matching_record_is_noop() {
        let h = harness();
        h.worker.insert_job("orphan-1", JobKind::Pdf);
        h.worker
            .complete("orphan-1", json!({"pdf_url": "https://cdn/orphan.pdf"}));

        let result = h
            .service
            .result(TaskRef::new("orphan-1", JobKind::Pdf))
            .await
            .unwrap();

        assert!(!result.record_updated);
        assert_eq!(h.analyses.write_count(), 0);
    }

    #[tokio::test]
    async fn test_result_on_unfinished_job_writes_nothing() {
        let h = harness();
        seed_record(&h, "a-1").await;
        let outcome = h.service.submit(analysis_submit(Some("a-1"))).await.unwrap();
        let writes = h.analyses.write_count();

        let err = h
            .service
            .result(TaskRef::new(&outcome.job_id, JobKind::Analysis))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::ExternalService(WorkerError::NotCompleted { .. })
        ));
        assert_eq!(h.analyses.write_count(), writes);
    }

    #[tokio::test]
    async fn test_result_on_failed_job_marks_failed() {
        let h = harness();
        seed_record(&h, "a-1").await;
        let outcome = h.service.submit(analysis_submit(Some("a-1"))).await.unwrap();
        h.worker.fail(&outcome.job_id, "model timeout");

        let err = h
            .service
            .result(TaskRef::new(&outcome.job_id, JobKind::Analysis))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model timeout"));

        let record = h.analyses.find_by_id("a-1").await.unwrap().unwrap();
        assert_eq!(record.analysis_status, Some(JobStatus::Failed));
        assert!(record.summary.is_none());

        let job = h.jobs.find_by_id(&outcome.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("model timeout"));
    }

    #[tokio::test]
    async fn test_result_with_malformed_payload() {
        let h = harness();
        h.worker.insert_job("t-9", JobKind::Analysis);
        h.worker.complete("t-9", json!({"insights": []}));

        let err = h
            .service
            .result(TaskRef::new("t-9", JobKind::Analysis))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ExternalService(WorkerError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_fetched_result() {
        let h = harness();
        seed_record(&h, "a-1").await;
        let outcome = h.service.submit(analysis_submit(Some("a-1"))).await.unwrap();
        h.worker.complete(&outcome.job_id, analysis_payload());
        h.analyses.set_fail_writes(true);

        let err = h
            .service
            .result(TaskRef::new(&outcome.job_id, JobKind::Analysis))
            .await
            .unwrap_err();

        match err {
            AppError::Persistence { result, .. } => {
                let result = result.expect("fetched result should be preserved");
                assert_eq!(result.kind(), JobKind::Analysis);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_worker() {
        let h = harness();
        h.worker.set_unreachable(true);

        let err = h
            .service
            .status(TaskRef::new("t-1", JobKind::Pdf))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ExternalService(WorkerError::Unreachable(_))
        ));
    }
}
