// src/handlers/admin_leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::lead_repo::LeadFilters,
    models::{
        lead::{LeadScore, LeadSource, LeadStatus, UpdateLeadPayload},
        project::ConvertLeadPayload,
    },
    services::project_service,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeadListQuery {
    pub search: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<LeadScore>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/admin/leads
#[utoipa::path(
    get,
    path = "/api/admin/leads",
    tag = "Admin - Leads",
    params(LeadListQuery, ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Listagem paginada de leads"),
        (status = 401, description = "Chave do admin ausente ou inválida")
    )
)]
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<LeadListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filters = LeadFilters {
        search: query.search.filter(|s| !s.trim().is_empty()),
        source: query.source,
        status: query.status,
        score: query.score,
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
    };

    let (leads, total) = state.store()?.leads.list(&filters).await?;
    Ok(Json(json!({
        "leads": leads,
        "total": total,
        "page": filters.page.max(1),
        "per_page": filters.limit.max(1),
    })))
}

// GET /api/admin/leads/{id}
#[utoipa::path(
    get,
    path = "/api/admin/leads/{id}",
    tag = "Admin - Leads",
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Detalhe completo do lead"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = state
        .store()?
        .leads
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Lead"))?;
    Ok(Json(lead))
}

// PATCH /api/admin/leads/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/leads/{id}",
    tag = "Admin - Leads",
    request_body = UpdateLeadPayload,
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Lead atualizado"),
        (status = 400, description = "Transição de status inválida"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn patch_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store()?;
    let lead = store
        .leads
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Lead"))?;

    if let Some(new_status) = payload.status {
        if !lead.status.can_transition(new_status) {
            return Err(AppError::InvalidInput(format!(
                "Cannot move lead from {:?} to {:?}",
                lead.status, new_status
            )));
        }
    }

    store
        .leads
        .update_admin_fields(id, payload.status, payload.notes.as_deref(), payload.lead_score)
        .await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

// POST /api/admin/leads/{id}/convert
#[utoipa::path(
    post,
    path = "/api/admin/leads/{id}/convert",
    tag = "Admin - Leads",
    request_body = ConvertLeadPayload,
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 201, description = "Projeto criado a partir do lead"),
        (status = 400, description = "Lead em estado final"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn convert_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConvertLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = project_service::convert_lead(&state, id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "projectId": project_id })),
    ))
}
