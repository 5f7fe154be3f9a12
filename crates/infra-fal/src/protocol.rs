// Queue REST wire types

use reportflow_core::domain::{JobSnapshot, JobStatus};
use serde::Deserialize;

/// Response to `POST {base}/{app}`
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub request_id: String,
}

/// Queue-side status vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    InQueue,
    InProgress,
    Completed,
    Failed,
    Error,
}

impl From<QueueStatus> for JobStatus {
    fn from(status: QueueStatus) -> Self {
        match status {
            QueueStatus::InQueue => JobStatus::Queued,
            QueueStatus::InProgress => JobStatus::Processing,
            QueueStatus::Completed => JobStatus::Completed,
            QueueStatus::Failed | QueueStatus::Error => JobStatus::Failed,
        }
    }
}

/// Response to `GET {base}/{app}/requests/{id}/status`
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: QueueStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl StatusResponse {
    pub fn into_snapshot(self) -> JobSnapshot {
        let status = JobStatus::from(self.status);

        // Fractions (0..=1) and percentages are both seen in the wild
        let progress = match (self.progress, status) {
            (_, JobStatus::Completed) => Some(100),
            (Some(p), _) if (0.0..=1.0).contains(&p) && p.fract() != 0.0 => {
                Some((p * 100.0).round() as u8)
            }
            (Some(p), _) => Some(p.clamp(0.0, 100.0).round() as u8),
            (None, JobStatus::Queued) => Some(0),
            (None, _) => None,
        };

        let error = self.error.map(|e| match e {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        JobSnapshot {
            status,
            progress,
            result: self.result,
            error,
        }
    }
}
