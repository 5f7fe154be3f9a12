// Submit Use Case

use crate::domain::{Job, JobId, JobKind, JobStatus};
use crate::error::{AppError, Result};
use crate::port::{AnalysisRepository, JobRepository, TimeProvider, WorkerQueue};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Submit request (raw, as received from the caller)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub kind: Option<String>,
    pub input: Option<serde_json::Value>,
    /// Analysis record to associate the new task with
    pub analysis_id: Option<String>,
}

/// Validated submit request
#[derive(Debug, Clone)]
pub struct SubmitCommand {
    pub kind: JobKind,
    pub input: serde_json::Value,
    pub analysis_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub job_id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
}

fn non_empty_str<'a>(input: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
}

/// Check that kind and a kind-specific reference are present
///
/// PDF jobs need a document reference (`documentUrl` or `reportId`),
/// analysis jobs need a dataset reference (`datasetUrl`).
pub fn validate_request(req: &SubmitRequest) -> Result<SubmitCommand> {
    let kind: JobKind = super::require(req.kind.as_deref(), "type")?
        .parse()
        .map_err(|e: crate::domain::DomainError| AppError::Validation(e.to_string()))?;

    let input = req
        .input
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::Validation("input is required".to_string()))?;

    if !input.is_object() {
        return Err(AppError::Validation("input must be a JSON object".to_string()));
    }

    match kind {
        JobKind::Pdf => {
            if non_empty_str(input, "documentUrl").is_none()
                && non_empty_str(input, "reportId").is_none()
            {
                return Err(AppError::Validation(
                    "PDF jobs require input.documentUrl or input.reportId".to_string(),
                ));
            }
        }
        JobKind::Analysis => {
            if non_empty_str(input, "datasetUrl").is_none() {
                return Err(AppError::Validation(
                    "Analysis jobs require input.datasetUrl".to_string(),
                ));
            }
        }
    }

    let analysis_id = req
        .analysis_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(SubmitCommand {
        kind,
        input: input.clone(),
        analysis_id,
    })
}

/// Execute submit use case
///
/// Enqueues with the worker first; the returned identifier is then mirrored
/// into the task store and, when `analysis_id` is set, attached to the record.
pub async fn execute(
    job_repo: &dyn JobRepository,
    analysis_repo: &dyn AnalysisRepository,
    worker: &dyn WorkerQueue,
    time_provider: &dyn TimeProvider,
    req: SubmitRequest,
) -> Result<SubmitOutcome> {
    let cmd = validate_request(&req)?;

    if let Some(analysis_id) = &cmd.analysis_id {
        if analysis_repo.find_by_id(analysis_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Analysis {} not found",
                analysis_id
            )));
        }
    }

    let job_id = worker.submit(cmd.kind, &cmd.input).await?;

    info!(
        job_id = %job_id,
        kind = %cmd.kind,
        analysis_id = ?cmd.analysis_id,
        "Job submitted to worker queue"
    );

    let now = time_provider.now_millis();
    let mut job = Job::new(job_id.clone(), now, cmd.kind, cmd.input);
    job.analysis_id = cmd.analysis_id.clone();

    job_repo
        .insert(&job)
        .await
        .map_err(|e| AppError::Persistence {
            message: format!("job {} was queued but could not be recorded: {}", job_id, e),
            result: None,
        })?;

    if let Some(analysis_id) = &cmd.analysis_id {
        let attached = analysis_repo
            .attach_task(analysis_id, cmd.kind, &job_id, now)
            .await?;
        if !attached {
            warn!(
                job_id = %job_id,
                analysis_id = %analysis_id,
                "Analysis record disappeared before task could be attached"
            );
        }
    }

    Ok(SubmitOutcome {
        job_id,
        kind: cmd.kind,
        status: JobStatus::Queued,
    })
}
