use std::sync::Arc;

use reportflow_core::application::{PdfQueueService, TaskService};
use reportflow_core::port::{AnalysisRepository, JobRepository, TimeProvider, WorkerQueue};

/// Shared state available to all handlers via `State<AppState>`
///
/// Cheap to clone: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskService>,
    pub pdf_queue: Arc<PdfQueueService>,
    pub analyses: Arc<dyn AnalysisRepository>,
}

impl AppState {
    /// Wire the services from their ports
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        analysis_repo: Arc<dyn AnalysisRepository>,
        worker: Arc<dyn WorkerQueue>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let tasks = Arc::new(TaskService::new(
            job_repo,
            analysis_repo.clone(),
            worker,
            time_provider,
        ));
        let pdf_queue = Arc::new(PdfQueueService::new(tasks.clone(), analysis_repo.clone()));

        Self {
            tasks,
            pdf_queue,
            analyses: analysis_repo,
        }
    }
}
