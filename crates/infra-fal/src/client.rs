//! REST client for the worker queue.
//!
//! Wraps the three queue endpoints (submit, status, result) using
//! [`reqwest`] and exposes them through the [`WorkerQueue`] port.

use crate::config::FalConfig;
use crate::error::FalError;
use crate::protocol::{StatusResponse, SubmitResponse};
use async_trait::async_trait;
use reportflow_core::domain::{JobId, JobKind, JobSnapshot};
use reportflow_core::port::{WorkerError, WorkerQueue};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// HTTP client for the worker queue
pub struct FalQueueClient {
    client: reqwest::Client,
    config: FalConfig,
}

impl FalQueueClient {
    /// Build a client with its own connection pool and request timeout
    pub fn new(config: FalConfig) -> Result<Self, FalError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    pub fn with_client(client: reqwest::Client, config: FalConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FalConfig {
        &self.config
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(reqwest::header::AUTHORIZATION, format!("Key {}", key)),
            None => request,
        }
    }

    /// `POST {base}/{app}` with the job input as the JSON body
    pub async fn submit_request(
        &self,
        kind: JobKind,
        input: &serde_json::Value,
    ) -> Result<String, FalError> {
        let url = self.config.app_url(kind);
        let response = self
            .authorize(self.client.post(&url))
            .json(input)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::parse_response(response).await?;
        if submitted.request_id.trim().is_empty() {
            return Err(FalError::Malformed("empty request_id".to_string()));
        }
        Ok(submitted.request_id)
    }

    /// `GET {base}/{app}/requests/{id}/status`
    pub async fn request_status(
        &self,
        kind: JobKind,
        request_id: &str,
    ) -> Result<JobSnapshot, FalError> {
        let url = self.request_url(kind, request_id, &["status"])?;
        let response = self.authorize(self.client.get(url)).send().await?;

        let status: StatusResponse = Self::parse_response(response).await?;
        Ok(status.into_snapshot())
    }

    /// `GET {base}/{app}/requests/{id}`
    pub async fn request_result(
        &self,
        kind: JobKind,
        request_id: &str,
    ) -> Result<serde_json::Value, FalError> {
        let url = self.request_url(kind, request_id, &[])?;
        let response = self.authorize(self.client.get(url)).send().await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// `{base}/{app}/requests/{id}` plus `suffix`, with the id percent-encoded
    /// as one path segment so it cannot leave the app's request namespace.
    fn request_url(
        &self,
        kind: JobKind,
        request_id: &str,
        suffix: &[&str],
    ) -> Result<reqwest::Url, FalError> {
        // the url crate drops dot segments instead of encoding them
        if matches!(request_id, "" | "." | "..") {
            return Err(FalError::InvalidRequestId(request_id.to_string()));
        }

        let app_url = self.config.app_url(kind);
        let mut url =
            reqwest::Url::parse(&app_url).map_err(|e| FalError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FalError::InvalidUrl(app_url.clone()))?
            .pop_if_empty()
            .push("requests")
            .push(request_id)
            .extend(suffix);
        Ok(url)
    }

    /// Return the response unchanged on 2xx, or an [`FalError::Api`] with
    /// the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FalError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FalError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON body; a body that does not match `T` is malformed
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FalError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FalError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl WorkerQueue for FalQueueClient {
    async fn submit(&self, kind: JobKind, input: &serde_json::Value) -> Result<JobId, WorkerError> {
        match self.submit_request(kind, input).await {
            Ok(request_id) => {
                info!(job_id = %request_id, kind = %kind, app = %self.config.app(kind), "Job enqueued with worker");
                Ok(request_id)
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Worker submit failed");
                Err(e.into())
            }
        }
    }

    async fn status(&self, kind: JobKind, job_id: &str) -> Result<JobSnapshot, WorkerError> {
        let snapshot = self.request_status(kind, job_id).await.map_err(|e| {
            warn!(job_id = %job_id, kind = %kind, error = %e, "Worker status request failed");
            WorkerError::from(e)
        })?;
        debug!(job_id = %job_id, status = %snapshot.status, "Worker status");
        Ok(snapshot)
    }

    async fn result(&self, kind: JobKind, job_id: &str) -> Result<serde_json::Value, WorkerError> {
        self.request_result(kind, job_id).await.map_err(|e| {
            warn!(job_id = %job_id, kind = %kind, error = %e, "Worker result request failed");
            WorkerError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportflow_core::domain::JobStatus;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FalQueueClient {
        let config = FalConfig::new(server.uri())
            .with_api_key("secret")
            .with_apps("acme/pdf", "acme/analysis")
            .with_timeout(Duration::from_secs(2));
        FalQueueClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn submit_posts_input_to_kind_app() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/acme/pdf"))
            .and(header("authorization", "Key secret"))
            .and(body_json(json!({"reportId": "r1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"request_id": "req-42", "status": "IN_QUEUE"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let id = client
            .submit(JobKind::Pdf, &json!({"reportId": "r1"}))
            .await
            .unwrap();
        assert_eq!(id, "req-42");
    }

    #[tokio::test]
    async fn status_maps_queue_vocabulary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/analysis/requests/req-7/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS", "progress": 40})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let snapshot = client.status(JobKind::Analysis, "req-7").await.unwrap();
        assert_eq!(snapshot.status, JobStatus::Processing);
        assert_eq!(snapshot.progress, Some(40));
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn result_returns_raw_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/pdf/requests/req-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"pdf_url": "https://cdn/r1.pdf"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let payload = client.result(JobKind::Pdf, "req-1").await.unwrap();
        assert_eq!(payload["pdf_url"], "https://cdn/r1.pdf");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/pdf/requests/missing/status"))
            .respond_with(ResponseTemplate::new(404).set_body_string("request not found"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.status(JobKind::Pdf, "missing").await.unwrap_err();
        match err {
            WorkerError::Rejected { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "request not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/acme/pdf/requests/req-1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.status(JobKind::Pdf, "req-1").await.unwrap_err();
        assert!(matches!(err, WorkerError::Malformed(_)));
    }

    #[tokio::test]
    async fn request_id_stays_inside_app_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/other-app/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for id in ["../../../other-app", "req-1?x=1", "req-1#frag", "a/b"] {
            let err = client.status(JobKind::Pdf, id).await.unwrap_err();
            assert!(
                matches!(err, WorkerError::Rejected { status: 404, .. }),
                "{}: {:?}",
                id,
                err
            );
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 4);
        for request in requests {
            let path = request.url.path();
            assert!(path.starts_with("/acme/pdf/requests/"), "{}", path);
            assert!(path.ends_with("/status"), "{}", path);
            assert_eq!(path.matches('/').count(), 5, "{}", path);
            assert!(request.url.query().is_none());
        }
    }

    #[tokio::test]
    async fn dot_segment_ids_are_not_sent() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        for id in [".", ".."] {
            let err = client.result(JobKind::Analysis, id).await.unwrap_err();
            assert!(matches!(err, WorkerError::Rejected { status: 400, .. }));
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_worker() {
        let config = FalConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(1));
        let client = FalQueueClient::new(config).unwrap();

        let err = client.status(JobKind::Pdf, "req-1").await.unwrap_err();
        assert!(matches!(err, WorkerError::Unreachable(_)));
    }
}
