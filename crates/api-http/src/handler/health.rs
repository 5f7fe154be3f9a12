use axum::extract::State;
use axum::Json;

use crate::state::AppState;
use crate::types::HealthResponse;

/// GET /health -- service and database health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.tasks.health().await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: reportflow_core::VERSION,
        db_healthy,
    })
}
