//! Reportflow Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    AnalysisRecord, Health, JobKind, JobStatus, PdfQueued, PdfStatus, SubmitRequest,
    SubmitResponse, TaskResult, TaskStatus,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Polling schedule for [`ReportflowClient::wait_for_completion`]
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// Reportflow daemon client
///
/// # Example
///
/// ```no_run
/// use reportflow_sdk::ReportflowClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReportflowClient::connect("http://127.0.0.1:8080").await?;
/// # Ok(())
/// # }
/// ```
pub struct ReportflowClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReportflowClient {
    /// Build a client without contacting the daemon
    pub fn new(url: impl AsRef<str>) -> Result<Self> {
        let base_url = url.as_ref().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Build a client and check the daemon answers `/health`
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let client = Self::new(url)?;
        client.health().await?;
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a job to the worker queue
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse> {
        let response = self
            .http
            .post(self.url("/api/fal/submit"))
            .json(&request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Worker-reported status; never changes anything server-side
    pub async fn status(&self, task_id: &str, kind: JobKind) -> Result<TaskStatus> {
        let response = self
            .http
            .get(self.url("/api/fal/status"))
            .query(&[("taskId", task_id), ("type", kind.as_str())])
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Fetch a completed job's result and write it to its analysis record
    pub async fn result(&self, task_id: &str, kind: JobKind) -> Result<TaskResult> {
        let response = self
            .http
            .get(self.url("/api/fal/result"))
            .query(&[("taskId", task_id), ("type", kind.as_str())])
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Queue a PDF render for a report
    pub async fn queue_pdf(&self, report_id: &str) -> Result<PdfQueued> {
        let response = self
            .http
            .post(self.url("/api/pdf/queue"))
            .json(&serde_json::json!({ "reportId": report_id }))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn pdf_status(&self, report_id: &str) -> Result<PdfStatus> {
        let response = self
            .http
            .get(self.url("/api/pdf/queue"))
            .query(&[("reportId", report_id)])
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn analysis(&self, id: &str) -> Result<AnalysisRecord> {
        // dot segments would be dropped by the url crate rather than encoded
        if matches!(id, "" | "." | "..") {
            return Err(SdkError::InvalidUrl(format!("invalid analysis id '{}'", id)));
        }

        let mut url = reqwest::Url::parse(&self.url("/api/analyses"))
            .map_err(|e| SdkError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SdkError::InvalidUrl(self.base_url.clone()))?
            .push(id);

        let response = self.http.get(url).send().await?;
        Self::parse(response).await
    }

    pub async fn health(&self) -> Result<Health> {
        let response = self.http.get(self.url("/health")).send().await?;
        Self::parse(response).await
    }

    /// Poll status until the job is terminal
    ///
    /// Returns the final status for `completed`, [`SdkError::JobFailed`] for
    /// `failed`, and [`SdkError::Timeout`] once `max_attempts` polls have
    /// seen a running job.
    pub async fn wait_for_completion(
        &self,
        task_id: &str,
        kind: JobKind,
        options: WaitOptions,
    ) -> Result<TaskStatus> {
        for attempt in 1..=options.max_attempts {
            let status = self.status(task_id, kind).await?;
            match status.status {
                JobStatus::Completed => return Ok(status),
                JobStatus::Failed => {
                    return Err(SdkError::JobFailed {
                        task_id: task_id.to_string(),
                        message: status
                            .error
                            .unwrap_or_else(|| "no error message".to_string()),
                    })
                }
                JobStatus::Queued | JobStatus::Processing => {
                    if attempt < options.max_attempts {
                        tokio::time::sleep(options.interval).await;
                    }
                }
            }
        }

        Err(SdkError::Timeout {
            task_id: task_id.to_string(),
            attempts: options.max_attempts,
        })
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();
            let field = |name: &str| {
                parsed
                    .as_ref()
                    .and_then(|v| v.get(name))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            };

            return Err(SdkError::Api {
                status: status.as_u16(),
                code: field("code"),
                message: field("error").unwrap_or_else(|| body.clone()),
                details: field("details"),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
