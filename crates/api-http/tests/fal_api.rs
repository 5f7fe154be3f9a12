//! Submit / status / result endpoints over in-memory adapters.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use reportflow_core::domain::JobKind;
use reportflow_core::port::AnalysisRepository;
use serde_json::json;

#[tokio::test]
async fn submit_returns_queued_task() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/fal/submit",
            json!({"type": "analysis", "input": {"datasetUrl": "s3://uploads/a.csv"}}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "queued");
    assert!(body["taskId"].as_str().unwrap().starts_with("analysis-"));
    assert_eq!(app.worker.call_count(), 1);
}

#[tokio::test]
async fn submit_without_reference_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/fal/submit", json!({"type": "pdf", "input": {}}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("documentUrl"));
    assert_eq!(app.worker.call_count(), 0);
}

#[tokio::test]
async fn submit_with_invalid_json_is_rejected() {
    let app = TestApp::new();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/fal/submit")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_and_result_without_type_are_400() {
    let app = TestApp::new();

    for uri in ["/api/fal/status?taskId=t-1", "/api/fal/result?taskId=t-1"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    for uri in ["/api/fal/status", "/api/fal/result?type=pdf"] {
        let (status, _) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }

    assert_eq!(app.worker.call_count(), 0);
}

#[tokio::test]
async fn task_id_with_path_characters_is_400() {
    let app = TestApp::new();

    for uri in [
        "/api/fal/status?taskId=..%2F..%2Fother-app&type=pdf",
        "/api/fal/result?taskId=t-1%3Fx%3D1&type=pdf",
        "/api/fal/status?taskId=..&type=analysis",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert_eq!(app.worker.call_count(), 0);
}

#[tokio::test]
async fn status_with_unknown_type_is_400() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/fal/status?taskId=t-1&type=video").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("video"));
}

#[tokio::test]
async fn status_passes_worker_view_through() {
    let app = TestApp::new();
    app.worker.insert_job("t-1", JobKind::Pdf);
    app.worker.set_processing("t-1", 55);

    let (status, body) = app.get("/api/fal/status?taskId=t-1&type=pdf").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taskId"], "t-1");
    assert_eq!(body["status"], "processing");
    assert_eq!(body["progress"], 55);
    assert!(body["result"].is_null());
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn result_for_orphan_task_returns_payload() {
    let app = TestApp::new();
    app.worker.insert_job("t-2", JobKind::Analysis);
    app.worker.complete(
        "t-2",
        json!({"summary": "Churn is flat", "insights": "Retention steady", "recommendations": []}),
    );

    let (status, body) = app.get("/api/fal/result?taskId=t-2&type=analysis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["updated"], false);
    assert_eq!(body["result"]["summary"], "Churn is flat");
    assert_eq!(body["result"]["insights"], json!(["Retention steady"]));
    assert_eq!(app.analyses.write_count(), 0);
}

#[tokio::test]
async fn result_before_completion_is_external_error() {
    let app = TestApp::new();
    app.worker.insert_job("t-3", JobKind::Pdf);

    let (status, body) = app.get("/api/fal/result?taskId=t-3&type=pdf").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "EXTERNAL_SERVICE_ERROR");
    assert!(body["details"].as_str().unwrap().contains("not completed"));
}

#[tokio::test]
async fn persistence_failure_still_returns_result() {
    let app = TestApp::new();
    app.seed_report("r9").await;

    let (_, queued) = app
        .post_json(
            "/api/fal/submit",
            json!({"type": "pdf", "input": {"reportId": "r9"}, "analysisId": "r9"}),
        )
        .await;
    let task_id = queued["taskId"].as_str().unwrap().to_string();
    app.worker
        .complete(&task_id, json!({"url": "https://cdn/r9.pdf"}));
    app.analyses.set_fail_writes(true);

    let (status, body) = app
        .get(&format!("/api/fal/result?taskId={}&type=pdf", task_id))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PERSISTENCE_ERROR");
    assert_eq!(body["result"]["pdfUrl"], "https://cdn/r9.pdf");

    let record = app.analyses.find_by_id("r9").await.unwrap().unwrap();
    assert!(record.pdf_url.is_none());
}

#[tokio::test]
async fn unreachable_worker_is_500() {
    let app = TestApp::new();
    app.worker.set_unreachable(true);

    let (status, body) = app.get("/api/fal/status?taskId=t-1&type=pdf").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "EXTERNAL_SERVICE_ERROR");
    assert!(body["error"].is_string());
}
