//! Miscellaneous endpoints.

use axum::{Json, extract::State, response::IntoResponse};
use service_core::error::AppError;

use crate::{
    AppState, dtos::ErrorResponse, dtos::form::TranslateTextRequest, services::ServiceError,
};

/// Translate free text via the LLM collaborator
#[utoipa::path(
    post,
    path = "/translate",
    request_body = TranslateTextRequest,
    responses(
        (status = 200, description = "Translated text"),
        (status = 502, description = "Provider failure", body = ErrorResponse)
    ),
    tag = "Miscellaneous"
)]
pub async fn translate_text(
    State(state): State<AppState>,
    Json(req): Json<TranslateTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    let translated = state
        .translator
        .translate_text(&req.text, req.language)
        .await
        .map_err(|e: ServiceError| AppError::from(e))?;
    Ok(Json(serde_json::json!({ "translated": translated })))
}
