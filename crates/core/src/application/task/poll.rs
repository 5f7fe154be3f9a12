// Status Poll Use Case (read-only)

use crate::domain::{JobId, JobKind, JobStatus};
use crate::error::Result;
use crate::port::WorkerQueue;
use serde::Serialize;
use tracing::debug;

/// Task identity as received from the caller (both fields required)
#[derive(Debug, Clone, Default)]
pub struct TaskRef {
    pub task_id: Option<String>,
    pub kind: Option<String>,
}

impl TaskRef {
    pub fn new(task_id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            task_id: Some(task_id.into()),
            kind: Some(kind.to_string()),
        }
    }

    /// Validate presence of both fields and parse the kind
    pub fn validate(&self) -> Result<(JobId, JobKind)> {
        let task_id = super::require(self.task_id.as_deref(), "taskId");
        let kind = super::require(self.kind.as_deref(), "type");

        let (task_id, kind) = match (task_id, kind) {
            (Ok(id), Ok(kind)) => (id, kind),
            (Err(_), Err(_)) => {
                return Err(crate::error::AppError::Validation(
                    "taskId and type are required".to_string(),
                ))
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };

        if matches!(task_id, "." | "..") || task_id.contains(&['/', '\\', '?', '#'][..]) {
            return Err(crate::error::AppError::Validation(format!(
                "taskId '{}' is not a valid task identifier",
                task_id
            )));
        }

        let kind = kind
            .parse::<JobKind>()
            .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

        Ok((task_id.to_string(), kind))
    }
}

/// Worker-reported status, passed through verbatim
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub task_id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Execute status poll
///
/// Never writes to any store; safe to call repeatedly.
pub async fn execute(worker: &dyn WorkerQueue, task: TaskRef) -> Result<TaskStatus> {
    let (task_id, kind) = task.validate()?;

    let snapshot = worker.status(kind, &task_id).await?;

    debug!(
        job_id = %task_id,
        kind = %kind,
        status = %snapshot.status,
        progress = ?snapshot.progress,
        "Polled job status"
    );

    Ok(TaskStatus {
        task_id,
        kind,
        status: snapshot.status,
        progress: snapshot.progress,
        result: snapshot.result,
        error: snapshot.error,
    })
}
