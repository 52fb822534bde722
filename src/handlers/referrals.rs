// src/handlers/referrals.rs

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::AppError, config::AppState, models::referral::SubmitReferralPayload,
    services::referral_service,
};

// POST /api/referrals
#[utoipa::path(
    post,
    path = "/api/referrals",
    tag = "Referrals",
    request_body = SubmitReferralPayload,
    responses(
        (status = 200, description = "Indicações registradas"),
        (status = 400, description = "Dados inválidos"),
        (status = 429, description = "Limite de submissões excedido"),
        (status = 503, description = "Banco de dados não configurado")
    )
)]
pub async fn submit_referrals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubmitReferralPayload>,
) -> Result<impl IntoResponse, AppError> {
    let referrer_id = referral_service::submit_referrals(&state, &headers, payload).await?;
    Ok(Json(json!({ "success": true, "id": referrer_id })))
}
