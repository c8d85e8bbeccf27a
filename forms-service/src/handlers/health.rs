//! Health endpoint.

use axum::{Json, extract::State, response::IntoResponse};
use service_core::error::AppError;

use crate::AppState;

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 500, description = "Database unreachable")
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.db.health_check().await?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version,
    })))
}
