// src/handlers/admin_referrals.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::{common::error::AppError, config::AppState};

// GET /api/admin/referrals
//
// Sem banco configurado a listagem volta vazia em vez de 503, como o
// dashboard espera.
#[utoipa::path(
    get,
    path = "/api/admin/referrals",
    tag = "Admin - Referrals",
    params(("x-admin-key" = String, Header, description = "Chave do admin")),
    responses(
        (status = 200, description = "Indicadores com os indicados aninhados"),
        (status = 401, description = "Chave do admin ausente ou inválida")
    )
)]
pub async fn list_referrers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let Some(store) = &state.store else {
        return Ok(Json(json!({ "referrers": [] })));
    };
    let referrers = store.referrals.list_with_referrals().await?;
    Ok(Json(json!({ "referrers": referrers })))
}
