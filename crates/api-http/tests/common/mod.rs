#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use reportflow_api_http::{build_router, AppState};
use reportflow_core::domain::{AnalysisRecord, FileMetadata};
use reportflow_core::port::analysis_repository::mocks::InMemoryAnalysisRepository;
use reportflow_core::port::job_repository::mocks::InMemoryJobRepository;
use reportflow_core::port::time_provider::FixedTimeProvider;
use reportflow_core::port::worker_queue::mocks::FakeWorkerQueue;
use reportflow_core::port::AnalysisRepository;
use tower::ServiceExt;

/// Router over in-memory adapters, plus handles to drive and inspect them
pub struct TestApp {
    pub router: Router,
    pub jobs: Arc<InMemoryJobRepository>,
    pub analyses: Arc<InMemoryAnalysisRepository>,
    pub worker: Arc<FakeWorkerQueue>,
}

impl TestApp {
    pub fn new() -> Self {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let analyses = Arc::new(InMemoryAnalysisRepository::new());
        let worker = Arc::new(FakeWorkerQueue::new());

        let state = AppState::new(
            jobs.clone(),
            analyses.clone(),
            worker.clone(),
            Arc::new(FixedTimeProvider::new(1_700_000_000_000)),
        );

        Self {
            router: build_router(state, Duration::from_secs(30)),
            jobs,
            analyses,
            worker,
        }
    }

    pub async fn seed_report(&self, id: &str) {
        let mut record = AnalysisRecord::new(
            id,
            "user-1",
            FileMetadata {
                file_name: "q3-sales.csv".to_string(),
                file_type: Some("text/csv".to_string()),
                file_size: Some(1024),
                file_url: Some(format!("s3://uploads/{}.csv", id)),
            },
            1_600_000_000_000,
        );
        record.summary = Some("Quarterly revenue up 8%".to_string());
        self.analyses.insert(&record).await.unwrap();
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(self.router.clone(), request).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(self.router.clone(), request).await
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
