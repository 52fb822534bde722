// src/handlers/admin_ai.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PolishReplyPayload {
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub draft_reply: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

// POST /api/admin/ai/polish-reply
#[utoipa::path(
    post,
    path = "/api/admin/ai/polish-reply",
    tag = "Admin - AI",
    request_body = PolishReplyPayload,
    params(("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Rascunho lapidado (ou intacto, sem chave da IA)"),
        (status = 400, description = "Pergunta ou rascunho ausente"),
        (status = 500, description = "Falha na chamada à IA")
    )
)]
pub async fn polish_reply(
    State(state): State<AppState>,
    Json(payload): Json<PolishReplyPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.question_text.trim().is_empty() || payload.draft_reply.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Missing question_text or draft_reply".to_string(),
        ));
    }

    let polished = state
        .ai
        .polish_reply(
            &payload.question_text,
            &payload.draft_reply,
            payload.project_id,
        )
        .await
        .map_err(AppError::InternalServerError)?;
    Ok(Json(json!({ "polished": polished })))
}
