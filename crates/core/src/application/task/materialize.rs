// Result Materialization Use Case
//
// Fetches the final payload of a completed job and writes it into the task
// store and the matching analysis record.

use super::poll::TaskRef;
use crate::domain::{JobId, JobKind, JobResult, JobStatus};
use crate::error::{AppError, Result};
use crate::port::{AnalysisRepository, JobRepository, TimeProvider, WorkerError, WorkerQueue};
use serde::Serialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct MaterializedResult {
    pub task_id: JobId,
    pub kind: JobKind,
    pub result: JobResult,
    /// Whether an analysis record was changed by this call
    pub record_updated: bool,
}

/// Execute result materialization
///
/// Flow:
/// 1. Ask the worker for the job status
/// 2. `failed`: mark job and record side as failed, return `ExternalService`
/// 3. not terminal: return `ExternalService` without writing anything
/// 4. `completed`: fetch and parse the payload, then persist it
///
/// A record that does not reference `task_id` is not an error, and writes are
/// conditional on the stored status so repeated calls converge.
pub async fn execute(
    job_repo: &dyn JobRepository,
    analysis_repo: &dyn AnalysisRepository,
    worker: &dyn WorkerQueue,
    time_provider: &dyn TimeProvider,
    task: TaskRef,
) -> Result<MaterializedResult> {
    let (task_id, kind) = task.validate()?;

    let snapshot = worker.status(kind, &task_id).await?;

    match snapshot.status {
        JobStatus::Completed => {}
        JobStatus::Failed => {
            let message = snapshot
                .error
                .unwrap_or_else(|| "worker reported failure".to_string());
            record_failure(job_repo, analysis_repo, time_provider, kind, &task_id, &message)
                .await?;
            return Err(WorkerError::JobFailed {
                job_id: task_id,
                message,
            }
            .into());
        }
        status => {
            return Err(WorkerError::NotCompleted {
                job_id: task_id,
                status: status.to_string(),
            }
            .into());
        }
    }

    let payload = worker.result(kind, &task_id).await?;
    let result = JobResult::from_worker_payload(kind, &payload)
        .map_err(|e| WorkerError::Malformed(e.to_string()))?;

    let now = time_provider.now_millis();
    match persist_completion(job_repo, analysis_repo, &task_id, &result, now).await {
        Ok(record_updated) => {
            info!(
                job_id = %task_id,
                kind = %kind,
                record_updated = record_updated,
                "Job result materialized"
            );
            Ok(MaterializedResult {
                task_id,
                kind,
                result,
                record_updated,
            })
        }
        Err(e) => {
            error!(job_id = %task_id, kind = %kind, error = %e, "Failed to persist job result");
            Err(AppError::persistence(e, result))
        }
    }
}

async fn persist_completion(
    job_repo: &dyn JobRepository,
    analysis_repo: &dyn AnalysisRepository,
    task_id: &str,
    result: &JobResult,
    now: i64,
) -> Result<bool> {
    match job_repo.find_by_id(&task_id.to_string()).await? {
        Some(mut job) if job.status.can_transition_to(JobStatus::Completed) => {
            job.complete(result.clone(), now)?;
            job_repo.record_outcome(&job).await?;
        }
        Some(job) => {
            debug!(job_id = %task_id, status = %job.status, "Job already terminal in task store");
        }
        None => {
            debug!(job_id = %task_id, "Job not tracked in task store");
        }
    }

    let updated = analysis_repo.apply_result(task_id, result, now).await?;
    if !updated {
        debug!(
            job_id = %task_id,
            "No open analysis record references this task; nothing written"
        );
    }
    Ok(updated)
}

async fn record_failure(
    job_repo: &dyn JobRepository,
    analysis_repo: &dyn AnalysisRepository,
    time_provider: &dyn TimeProvider,
    kind: JobKind,
    task_id: &str,
    message: &str,
) -> Result<()> {
    let now = time_provider.now_millis();

    match write_failure(job_repo, analysis_repo, kind, task_id, message, now).await {
        Ok(updated) => {
            warn!(
                job_id = %task_id,
                kind = %kind,
                error = %message,
                record_updated = updated,
                "Worker reported job failure"
            );
            Ok(())
        }
        Err(e) => Err(AppError::Persistence {
            message: format!("could not record failure of job {}: {}", task_id, e),
            result: None,
        }),
    }
}

async fn write_failure(
    job_repo: &dyn JobRepository,
    analysis_repo: &dyn AnalysisRepository,
    kind: JobKind,
    task_id: &str,
    message: &str,
    now: i64,
) -> Result<bool> {
    if let Some(mut job) = job_repo.find_by_id(&task_id.to_string()).await? {
        if job.status.can_transition_to(JobStatus::Failed) {
            job.fail(message, now)?;
            job_repo.record_outcome(&job).await?;
        }
    }
    analysis_repo.mark_failed(kind, task_id, now).await
}
