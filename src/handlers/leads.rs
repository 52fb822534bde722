// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::lead::SubmitLeadPayload,
    services::lead_service::{self, ApproveOutcome},
};

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = SubmitLeadPayload,
    responses(
        (status = 200, description = "Lead registrado e pipeline disparado"),
        (status = 400, description = "Dados inválidos"),
        (status = 429, description = "Limite de submissões excedido"),
        (status = 503, description = "Banco de dados não configurado")
    )
)]
pub async fn submit_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead_id = lead_service::submit_lead(&state, &headers, payload).await?;
    Ok(Json(json!({ "success": true, "leadId": lead_id })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApproveQuery {
    pub token: Option<String>,
}

// GET /api/leads/{id}/approve?token=
//
// Clique vindo do e-mail interno, então a resposta é uma página HTML
// mínima e não JSON.
#[utoipa::path(
    get,
    path = "/api/leads/{id}/approve",
    tag = "Leads",
    params(
        ("id" = Uuid, Path, description = "ID do lead"),
        ApproveQuery
    ),
    responses(
        (status = 200, description = "Página de confirmação", content_type = "text/html"),
        (status = 403, description = "Token inválido"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn approve_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ApproveQuery>,
) -> Result<Html<String>, AppError> {
    let token = query.token.ok_or(AppError::InvalidToken)?;

    match lead_service::approve_lead(&state, id, &token).await? {
        ApproveOutcome::AlreadySent => Ok(Html(
            r#"<html><body style="font-family:sans-serif;text-align:center;padding:60px;">
  <h2>Already Sent</h2>
  <p>The detailed follow-up email has already been sent for this lead.</p>
</body></html>"#
                .to_string(),
        )),
        ApproveOutcome::Approved { lead_id, full_name } => Ok(Html(format!(
            r##"<html><body style="font-family:sans-serif;text-align:center;padding:60px;">
  <div style="max-width:500px;margin:0 auto;">
    <div style="width:64px;height:64px;background:#03FF00;border-radius:50%;margin:0 auto 20px;display:flex;align-items:center;justify-content:center;">
      <svg width="32" height="32" viewBox="0 0 24 24" fill="none" stroke="#033457" stroke-width="3"><path d="M20 6L9 17l-5-5"/></svg>
    </div>
    <h2 style="color:#033457;">Follow-Up Approved</h2>
    <p style="color:#666;">The detailed project breakdown email has been queued for <strong>{full_name}</strong>.</p>
    <p style="color:#999;font-size:14px;margin-top:24px;">Lead ID: {lead_id}</p>
  </div>
</body></html>"##
        ))),
    }
}
