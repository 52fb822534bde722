// src/handlers/portal.rs
//
// Superfície do cliente. Tudo menos o magic link exige a sessão assinada
// (extrator ClientSession); cada consulta é filtrada pelo e-mail da sessão,
// então um cliente nunca enxerga projeto alheio.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::ClientSession,
    models::project::{AskQuestionPayload, ProjectDetail, ProjectSummary},
    services::project_service,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct MagicLinkPayload {
    #[serde(default)]
    pub email: String,
}

// POST /api/portal/auth/magic-link
#[utoipa::path(
    post,
    path = "/api/portal/auth/magic-link",
    tag = "Portal",
    request_body = MagicLinkPayload,
    responses(
        (status = 200, description = "Link de acesso enviado por e-mail"),
        (status = 404, description = "Nenhum projeto para este e-mail")
    )
)]
pub async fn request_magic_link(
    State(state): State<AppState>,
    Json(payload): Json<MagicLinkPayload>,
) -> Result<impl IntoResponse, AppError> {
    project_service::request_magic_link(&state, &payload.email).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Magic link sent. Check your email.",
    })))
}

// GET /api/portal/projects
#[utoipa::path(
    get,
    path = "/api/portal/projects",
    tag = "Portal",
    security(("portal_session" = [])),
    responses(
        (status = 200, description = "Projetos do cliente da sessão", body = [ProjectSummary]),
        (status = 401, description = "Sessão ausente ou inválida")
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    session: ClientSession,
) -> Result<impl IntoResponse, AppError> {
    let projects = project_service::list_for_client(&state, &session.client_email).await?;
    Ok(Json(json!({ "projects": projects })))
}

// GET /api/portal/projects/{id}
#[utoipa::path(
    get,
    path = "/api/portal/projects/{id}",
    tag = "Portal",
    security(("portal_session" = [])),
    params(("id" = Uuid, Path)),
    responses(
        (status = 200, description = "Detalhe do projeto do cliente", body = ProjectDetail),
        (status = 404, description = "Projeto inexistente ou de outro cliente")
    )
)]
pub async fn project_detail(
    State(state): State<AppState>,
    session: ClientSession,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = project_service::client_detail(&state, id, &session.client_email).await?;
    Ok(Json(detail))
}

// POST /api/portal/projects/{id}/questions
#[utoipa::path(
    post,
    path = "/api/portal/projects/{id}/questions",
    tag = "Portal",
    security(("portal_session" = [])),
    request_body = AskQuestionPayload,
    params(("id" = Uuid, Path)),
    responses(
        (status = 201, description = "Pergunta registrada e time avisado"),
        (status = 404, description = "Projeto inexistente ou de outro cliente")
    )
)]
pub async fn ask_question(
    State(state): State<AppState>,
    session: ClientSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<AskQuestionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let question_id =
        project_service::ask_question(&state, id, &session.client_email, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "questionId": question_id })),
    ))
}
