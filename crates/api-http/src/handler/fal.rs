//! Worker job endpoints: submit, status, result

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{ResultResponse, StatusResponse, SubmitBody, SubmitResponse, TaskQuery};

/// POST /api/fal/submit
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<SubmitBody>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(body) = body?;
    let outcome = state.tasks.submit(body.into()).await?;

    info!(job_id = %outcome.job_id, kind = %outcome.kind, "Job submitted");
    Ok(Json(outcome.into()))
}

/// GET /api/fal/status?taskId=..&type=..
///
/// Read-only pass-through of the worker's view.
pub async fn status(
    State(state): State<AppState>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Query(query) = query?;
    let status = state.tasks.status(query.into()).await?;
    Ok(Json(status.into()))
}

/// GET /api/fal/result?taskId=..&type=..
pub async fn result(
    State(state): State<AppState>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<ResultResponse>> {
    let Query(query) = query?;
    let materialized = state.tasks.result(query.into()).await?;
    Ok(Json(materialized.into()))
}
