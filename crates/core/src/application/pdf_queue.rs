// PDF Report Queue
//
// Report-centric entry point for PDF rendering: callers know the report
// (analysis record) id, not the worker task id.

use crate::application::task::{SubmitRequest, TaskService};
use crate::domain::{AnalysisRecord, JobId, JobKind, JobStatus};
use crate::error::{AppError, Result};
use crate::port::AnalysisRepository;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Label reported for reports that never had a PDF job
pub const NOT_QUEUED: &str = "not_queued";

#[derive(Debug, Clone, Serialize)]
pub struct PdfQueued {
    pub report_id: String,
    pub task_id: JobId,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfQueueStatus {
    pub report_id: String,
    pub status: Option<JobStatus>,
    pub task_id: Option<JobId>,
    pub pdf_url: Option<String>,
}

impl PdfQueueStatus {
    pub fn status_label(&self) -> &str {
        self.status.map(|s| s.as_str()).unwrap_or(NOT_QUEUED)
    }
}

pub struct PdfQueueService {
    tasks: Arc<TaskService>,
    analysis_repo: Arc<dyn AnalysisRepository>,
}

impl PdfQueueService {
    pub fn new(tasks: Arc<TaskService>, analysis_repo: Arc<dyn AnalysisRepository>) -> Self {
        Self {
            tasks,
            analysis_repo,
        }
    }

    async fn load(&self, report_id: Option<&str>) -> Result<AnalysisRecord> {
        let report_id = crate::application::task::require(report_id, "reportId")?;
        self.analysis_repo
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))
    }

    /// Queue a PDF render for a report
    ///
    /// The render input carries the report's current analysis content so the
    /// worker does not need database access.
    pub async fn queue(&self, report_id: Option<&str>) -> Result<PdfQueued> {
        let record = self.load(report_id).await?;

        let input = json!({
            "reportId": record.id,
            "documentUrl": record.file.file_url,
            "title": record.file.file_name,
            "summary": record.summary,
            "insights": record.insights,
            "recommendations": record.recommendations,
        });

        let outcome = self
            .tasks
            .submit(SubmitRequest {
                kind: Some(JobKind::Pdf.to_string()),
                input: Some(input),
                analysis_id: Some(record.id.clone()),
            })
            .await?;

        info!(report_id = %record.id, job_id = %outcome.job_id, "PDF generation queued");

        Ok(PdfQueued {
            report_id: record.id,
            task_id: outcome.job_id,
            status: outcome.status,
        })
    }

    /// Current PDF status stored on the report
    pub async fn status(&self, report_id: Option<&str>) -> Result<PdfQueueStatus> {
        let record = self.load(report_id).await?;

        Ok(PdfQueueStatus {
            status: record.pdf_status,
            task_id: record.pdf_task_id,
            pdf_url: record.pdf_url,
            report_id: record.id,
        })
    }
}
