//! Report-centric PDF queue

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{PdfQueueBody, PdfQueueResponse, PdfStatusQuery, PdfStatusResponse};

/// POST /api/pdf/queue
pub async fn queue(
    State(state): State<AppState>,
    body: Result<Json<PdfQueueBody>, JsonRejection>,
) -> ApiResult<Json<PdfQueueResponse>> {
    let Json(body) = body?;
    let queued = state.pdf_queue.queue(body.report_id.as_deref()).await?;
    Ok(Json(queued.into()))
}

/// GET /api/pdf/queue?reportId=..
pub async fn status(
    State(state): State<AppState>,
    query: Result<Query<PdfStatusQuery>, QueryRejection>,
) -> ApiResult<Json<PdfStatusResponse>> {
    let Query(query) = query?;
    let status = state.pdf_queue.status(query.report_id.as_deref()).await?;
    Ok(Json(status.into()))
}
