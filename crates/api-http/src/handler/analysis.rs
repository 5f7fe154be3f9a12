use axum::extract::{Path, State};
use axum::Json;
use reportflow_core::domain::AnalysisRecord;
use reportflow_core::error::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/analyses/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisRecord>> {
    let record = state
        .analyses
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {} not found", id)))?;
    Ok(Json(record))
}
