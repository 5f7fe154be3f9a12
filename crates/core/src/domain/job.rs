// Job Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Job ID (opaque string minted by the worker queue)
pub type JobId = String;

/// Job Kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pdf" => Ok(JobKind::Pdf),
            "analysis" => Ok(JobKind::Analysis),
            other => Err(DomainError::ValidationError(format!(
                "Invalid type '{}': expected 'pdf' or 'analysis'",
                other
            ))),
        }
    }
}

/// Job Status
///
/// Moves forward only: `queued -> processing -> completed | failed`.
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether `self -> next` is a forward move.
    ///
    /// Skipping `processing` is allowed: a poller can miss the intermediate
    /// state entirely when the worker is fast.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "Unknown job status: {}",
                other
            ))),
        }
    }
}

/// Finished PDF render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOutput {
    pub pdf_url: String,
}

/// Finished AI analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub summary: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Final payload of a completed job (shape depends on the job kind)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    Pdf(PdfOutput),
    Analysis(AnalysisOutput),
}

impl JobResult {
    pub fn kind(&self) -> JobKind {
        match self {
            JobResult::Pdf(_) => JobKind::Pdf,
            JobResult::Analysis(_) => JobKind::Analysis,
        }
    }

    /// Parse a raw worker payload into the typed result for `kind`.
    ///
    /// PDF payloads may carry the URL as `pdf_url`, `pdfUrl`, `url` or
    /// `file.url`. Analysis payloads need a `summary`; `insights` and
    /// `recommendations` accept either a list of strings or a single string.
    pub fn from_worker_payload(kind: JobKind, payload: &serde_json::Value) -> Result<Self> {
        match kind {
            JobKind::Pdf => {
                let url = ["pdf_url", "pdfUrl", "url"]
                    .iter()
                    .find_map(|key| payload.get(key).and_then(|v| v.as_str()))
                    .or_else(|| {
                        payload
                            .get("file")
                            .and_then(|f| f.get("url"))
                            .and_then(|v| v.as_str())
                    })
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        DomainError::MalformedPayload("PDF result has no URL".to_string())
                    })?;

                Ok(JobResult::Pdf(PdfOutput {
                    pdf_url: url.to_string(),
                }))
            }
            JobKind::Analysis => {
                let summary = payload
                    .get("summary")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        DomainError::MalformedPayload("Analysis result has no summary".to_string())
                    })?;

                Ok(JobResult::Analysis(AnalysisOutput {
                    summary: summary.to_string(),
                    insights: string_list(payload.get("insights"), "insights")?,
                    recommendations: string_list(
                        payload.get("recommendations"),
                        "recommendations",
                    )?,
                }))
            }
        }
    }
}

fn string_list(value: Option<&serde_json::Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::String(s)) => Ok(vec![s.clone()]),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    DomainError::MalformedPayload(format!("{} must contain only strings", field))
                })
            })
            .collect(),
        Some(_) => Err(DomainError::MalformedPayload(format!(
            "{} must be a list of strings",
            field
        ))),
    }
}

/// Point-in-time view of a job as reported by the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

/// Job Entity (local mirror of a job tracked by the worker queue)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub result: Option<JobResult>,
    pub error: Option<String>,

    /// Analysis record this job was submitted for, if any
    pub analysis_id: Option<String>,
    pub input: serde_json::Value,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
    pub finished_at: Option<i64>,
}

impl Job {
    /// Create a queued job
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier returned by the worker queue
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `kind` - Job kind
    /// * `input` - Payload submitted to the worker
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        kind: JobKind,
        input: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            status: JobStatus::Queued,
            progress: Some(0),
            result: None,
            error: None,
            analysis_id: None,
            input,
            created_at,
            updated_at: created_at,
            finished_at: None,
        }
    }

    fn transition(&mut self, next: JobStatus, now_millis: i64) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = now_millis;
        if next.is_terminal() {
            self.finished_at = Some(now_millis);
        }
        Ok(())
    }

    /// Transition to Processing
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Processing, now_millis)
    }

    /// Transition to Completed, storing the final payload
    pub fn complete(&mut self, result: JobResult, now_millis: i64) -> Result<()> {
        if result.kind() != self.kind {
            return Err(DomainError::ValidationError(format!(
                "Result of kind {} cannot complete a {} job",
                result.kind(),
                self.kind
            )));
        }
        self.transition(JobStatus::Completed, now_millis)?;
        self.progress = Some(100);
        self.result = Some(result);
        Ok(())
    }

    /// Transition to Failed
    pub fn fail(&mut self, error: impl Into<String>, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Failed, now_millis)?;
        self.error = Some(error.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pdf_job() -> Job {
        Job::new("req-1", 1_000, JobKind::Pdf, json!({"reportId": "r1"}))
    }

    #[test]
    fn test_status_moves_forward_only() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Processing));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));

        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Queued));
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn test_complete_sets_terminal_fields() {
        let mut job = pdf_job();
        job.start(2_000).unwrap();
        job.complete(
            JobResult::Pdf(PdfOutput {
                pdf_url: "https://cdn/r1.pdf".to_string(),
            }),
            3_000,
        )
        .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, Some(100));
        assert_eq!(job.finished_at, Some(3_000));
        assert!(job.fail("late failure", 4_000).is_err());
    }

    #[test]
    fn test_complete_rejects_wrong_result_kind() {
        let mut job = pdf_job();
        let result = JobResult::Analysis(AnalysisOutput {
            summary: "s".to_string(),
            insights: vec![],
            recommendations: vec![],
        });
        assert!(job.complete(result, 2_000).is_err());
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("pdf".parse::<JobKind>().unwrap(), JobKind::Pdf);
        assert_eq!("analysis".parse::<JobKind>().unwrap(), JobKind::Analysis);
        let err = "video".parse::<JobKind>().unwrap_err();
        assert!(err.to_string().contains("video"));
    }

    #[test]
    fn test_pdf_payload_variants() {
        for payload in [
            json!({"pdf_url": "https://a/x.pdf"}),
            json!({"url": "https://a/x.pdf"}),
            json!({"file": {"url": "https://a/x.pdf", "content_type": "application/pdf"}}),
        ] {
            let result = JobResult::from_worker_payload(JobKind::Pdf, &payload).unwrap();
            assert_eq!(
                result,
                JobResult::Pdf(PdfOutput {
                    pdf_url: "https://a/x.pdf".to_string()
                })
            );
        }

        assert!(JobResult::from_worker_payload(JobKind::Pdf, &json!({"url": ""})).is_err());
        assert!(JobResult::from_worker_payload(JobKind::Pdf, &json!({})).is_err());
    }

    #[test]
    fn test_analysis_payload() {
        let payload = json!({
            "summary": "Revenue grew 12%",
            "insights": ["Q3 was strongest", "Churn is flat"],
            "recommendations": "Expand the sales team"
        });
        let result = JobResult::from_worker_payload(JobKind::Analysis, &payload).unwrap();
        match result {
            JobResult::Analysis(output) => {
                assert_eq!(output.summary, "Revenue grew 12%");
                assert_eq!(output.insights.len(), 2);
                assert_eq!(output.recommendations, vec!["Expand the sales team"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let bad = json!({"summary": "x", "insights": [1, 2]});
        assert!(JobResult::from_worker_payload(JobKind::Analysis, &bad).is_err());
    }

    #[test]
    fn test_result_wire_shape() {
        let pdf = JobResult::Pdf(PdfOutput {
            pdf_url: "https://a/x.pdf".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&pdf).unwrap(),
            json!({"pdfUrl": "https://a/x.pdf"})
        );
    }
}
