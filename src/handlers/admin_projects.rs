// src/handlers/admin_projects.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::project::{
        AddMilestonePayload, AddPhasePayload, CreateDemoPayload, CreateProjectPayload,
        ProjectDetail, ProjectMilestone, ProjectSummary, ReorderMilestonePayload,
        ReplyQuestionPayload, UpdateMilestonePayload, UpdateProjectPayload,
    },
    services::project_service,
};

// =============================================================================
//  PROJETOS
// =============================================================================

// GET /api/admin/projects
#[utoipa::path(
    get,
    path = "/api/admin/projects",
    tag = "Admin - Projects",
    params(("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Projetos com progresso e fase atual", body = [ProjectSummary])
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let projects = project_service::list_admin(&state).await?;
    Ok(Json(json!({ "projects": projects })))
}

// POST /api/admin/projects
#[utoipa::path(
    post,
    path = "/api/admin/projects",
    tag = "Admin - Projects",
    request_body = CreateProjectPayload,
    params(("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 201, description = "Projeto criado com o template padrão"),
        (status = 400, description = "Campos obrigatórios ausentes")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let id = project_service::create_project(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

// GET /api/admin/projects/{id}
#[utoipa::path(
    get,
    path = "/api/admin/projects/{id}",
    tag = "Admin - Projects",
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Detalhe agregado do projeto", body = ProjectDetail),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = project_service::admin_detail(&state, id).await?;
    Ok(Json(detail))
}

// PATCH /api/admin/projects/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/projects/{id}",
    tag = "Admin - Projects",
    request_body = UpdateProjectPayload,
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Projeto atualizado"),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn patch_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store()?;
    store
        .projects
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    store.projects.update_fields(id, &payload).await?;
    Ok(Json(json!({ "success": true, "id": id })))
}

// =============================================================================
//  FASES E MARCOS
// =============================================================================

// POST /api/admin/projects/{id}/phases
#[utoipa::path(
    post,
    path = "/api/admin/projects/{id}/phases",
    tag = "Admin - Projects",
    request_body = AddPhasePayload,
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses((status = 201, description = "Fase adicionada"))
)]
pub async fn add_phase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddPhasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let phase_id = project_service::add_phase(&state, id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "phaseId": phase_id })),
    ))
}

// POST /api/admin/projects/{id}/phases/{phase_id}
#[utoipa::path(
    post,
    path = "/api/admin/projects/{id}/phases/{phase_id}",
    tag = "Admin - Projects",
    request_body = AddMilestonePayload,
    params(
        ("id" = Uuid, Path),
        ("phase_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses((status = 201, description = "Marco adicionado à fase", body = ProjectMilestone))
)]
pub async fn add_milestone(
    State(state): State<AppState>,
    Path((id, phase_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AddMilestonePayload>,
) -> Result<impl IntoResponse, AppError> {
    let milestone = project_service::add_milestone(&state, id, phase_id, payload).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

// DELETE /api/admin/projects/{id}/phases/{phase_id}
#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}/phases/{phase_id}",
    tag = "Admin - Projects",
    params(
        ("id" = Uuid, Path),
        ("phase_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses((status = 200, description = "Fase removida (marcos em cascata)"))
)]
pub async fn delete_phase(
    State(state): State<AppState>,
    Path((id, phase_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    project_service::delete_phase(&state, id, phase_id).await?;
    Ok(Json(json!({ "success": true })))
}

// PATCH /api/admin/projects/{id}/milestones/{m_id}
#[utoipa::path(
    patch,
    path = "/api/admin/projects/{id}/milestones/{m_id}",
    tag = "Admin - Projects",
    request_body = UpdateMilestonePayload,
    params(
        ("id" = Uuid, Path),
        ("m_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses(
        (status = 200, description = "Marco atualizado", body = ProjectMilestone),
        (status = 404, description = "Marco não encontrado")
    )
)]
pub async fn patch_milestone(
    State(state): State<AppState>,
    Path((id, m_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMilestonePayload>,
) -> Result<impl IntoResponse, AppError> {
    let milestone = project_service::update_milestone(&state, id, m_id, payload).await?;
    Ok(Json(milestone))
}

// DELETE /api/admin/projects/{id}/milestones/{m_id}
#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}/milestones/{m_id}",
    tag = "Admin - Projects",
    params(
        ("id" = Uuid, Path),
        ("m_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses((status = 200, description = "Marco removido"))
)]
pub async fn delete_milestone(
    State(state): State<AppState>,
    Path((id, m_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    project_service::delete_milestone(&state, id, m_id).await?;
    Ok(Json(json!({ "success": true })))
}

// POST /api/admin/projects/{id}/milestones/{m_id}/reorder
#[utoipa::path(
    post,
    path = "/api/admin/projects/{id}/milestones/{m_id}/reorder",
    tag = "Admin - Projects",
    request_body = ReorderMilestonePayload,
    params(
        ("id" = Uuid, Path),
        ("m_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses((status = 200, description = "Troca com o vizinho (no-op na borda)"))
)]
pub async fn reorder_milestone(
    State(state): State<AppState>,
    Path((id, m_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReorderMilestonePayload>,
) -> Result<impl IntoResponse, AppError> {
    project_service::reorder_milestone(&state, id, m_id, payload.direction).await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
//  DEMOS E PERGUNTAS
// =============================================================================

// POST /api/admin/projects/{id}/demos
#[utoipa::path(
    post,
    path = "/api/admin/projects/{id}/demos",
    tag = "Admin - Projects",
    request_body = CreateDemoPayload,
    params(("id" = Uuid, Path), ("x-admin-key" = String, Header, description = "Chave do admin")),
    responses((status = 201, description = "Demo compartilhada com o cliente"))
)]
pub async fn create_demo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateDemoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let demo = project_service::create_demo(&state, id, payload).await?;
    Ok((StatusCode::CREATED, Json(demo)))
}

// DELETE /api/admin/projects/{id}/demos/{demo_id}
#[utoipa::path(
    delete,
    path = "/api/admin/projects/{id}/demos/{demo_id}",
    tag = "Admin - Projects",
    params(
        ("id" = Uuid, Path),
        ("demo_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses((status = 200, description = "Demo removida"))
)]
pub async fn delete_demo(
    State(state): State<AppState>,
    Path((id, demo_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    project_service::delete_demo(&state, id, demo_id).await?;
    Ok(Json(json!({ "success": true })))
}

// POST /api/admin/projects/{id}/questions/{q_id}/reply
#[utoipa::path(
    post,
    path = "/api/admin/projects/{id}/questions/{q_id}/reply",
    tag = "Admin - Projects",
    request_body = ReplyQuestionPayload,
    params(
        ("id" = Uuid, Path),
        ("q_id" = Uuid, Path),
        ("x-admin-key" = String, Header, description = "Chave do admin")
    ),
    responses(
        (status = 200, description = "Resposta registrada e cliente notificado"),
        (status = 404, description = "Pergunta não encontrada")
    )
)]
pub async fn reply_question(
    State(state): State<AppState>,
    Path((id, q_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReplyQuestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let question = project_service::reply_question(&state, id, q_id, payload).await?;
    Ok(Json(question))
}
