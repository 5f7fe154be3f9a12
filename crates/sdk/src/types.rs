//! Request/Response Types
//!
//! Mirrors the daemon's JSON bodies (camelCase on the wire).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Pdf,
    Analysis,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Pdf => "pdf",
            JobKind::Analysis => "analysis",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(JobKind::Pdf),
            "analysis" => Ok(JobKind::Analysis),
            other => Err(format!("unknown job type '{}': expected pdf or analysis", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// POST /api/fal/submit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(rename = "type")]
    pub kind: JobKind,
    pub input: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
}

impl SubmitRequest {
    pub fn new(kind: JobKind, input: serde_json::Value) -> Self {
        Self {
            kind,
            input,
            analysis_id: None,
        }
    }

    /// Attach the new task to an analysis record
    pub fn for_analysis(mut self, analysis_id: impl Into<String>) -> Self {
        self.analysis_id = Some(analysis_id.into());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: String,
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub success: bool,
    pub task_id: String,
    pub result: serde_json::Value,
    pub updated: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfQueued {
    pub message: String,
    pub status: JobStatus,
    pub task_id: String,
    pub report_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfStatus {
    pub report_id: String,
    /// Job status, or `not_queued`
    pub status: String,
    pub task_id: Option<String>,
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub file_url: Option<String>,
    pub analysis_status: Option<JobStatus>,
    pub analysis_task_id: Option<String>,
    pub summary: Option<String>,
    pub insights: Option<Vec<String>>,
    pub recommendations: Option<Vec<String>>,
    pub pdf_status: Option<JobStatus>,
    pub pdf_task_id: Option<String>,
    pub pdf_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub version: String,
    pub db_healthy: bool,
}
