//! Wire Types
//!
//! Request and response bodies as seen by HTTP clients (camelCase).

use reportflow_core::application::{
    MaterializedResult, PdfQueueStatus, PdfQueued, SubmitOutcome, SubmitRequest, TaskRef,
    TaskStatus,
};
use reportflow_core::domain::{JobResult, JobStatus};
use serde::{Deserialize, Serialize};

/// POST /api/fal/submit
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub input: Option<serde_json::Value>,
    pub analysis_id: Option<String>,
}

impl From<SubmitBody> for SubmitRequest {
    fn from(body: SubmitBody) -> Self {
        SubmitRequest {
            kind: body.kind,
            input: body.input,
            analysis_id: body.analysis_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: String,
    pub status: JobStatus,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            task_id: outcome.job_id,
            status: outcome.status,
        }
    }
}

/// Query string of GET /api/fal/status and GET /api/fal/result
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub task_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl From<TaskQuery> for TaskRef {
    fn from(query: TaskQuery) -> Self {
        TaskRef {
            task_id: query.task_id,
            kind: query.kind,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub task_id: String,
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl From<TaskStatus> for StatusResponse {
    fn from(status: TaskStatus) -> Self {
        Self {
            task_id: status.task_id,
            status: status.status,
            progress: status.progress,
            result: status.result,
            error: status.error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultResponse {
    pub success: bool,
    pub task_id: String,
    pub result: JobResult,
    /// Whether an analysis record was written by this call
    pub updated: bool,
}

impl From<MaterializedResult> for ResultResponse {
    fn from(materialized: MaterializedResult) -> Self {
        Self {
            success: true,
            task_id: materialized.task_id,
            result: materialized.result,
            updated: materialized.record_updated,
        }
    }
}

/// POST /api/pdf/queue
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfQueueBody {
    pub report_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfQueueResponse {
    pub message: String,
    pub status: JobStatus,
    pub task_id: String,
    pub report_id: String,
}

impl From<PdfQueued> for PdfQueueResponse {
    fn from(queued: PdfQueued) -> Self {
        Self {
            message: "PDF generation queued".to_string(),
            status: queued.status,
            task_id: queued.task_id,
            report_id: queued.report_id,
        }
    }
}

/// Query string of GET /api/pdf/queue
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfStatusQuery {
    pub report_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfStatusResponse {
    pub report_id: String,
    /// `queued|processing|completed|failed`, or `not_queued`
    pub status: String,
    pub task_id: Option<String>,
    pub pdf_url: Option<String>,
}

impl From<PdfQueueStatus> for PdfStatusResponse {
    fn from(status: PdfQueueStatus) -> Self {
        Self {
            status: status.status_label().to_string(),
            report_id: status.report_id,
            task_id: status.task_id,
            pdf_url: status.pdf_url,
        }
    }
}

/// GET /health
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}
