// src/handlers/webhooks.rs

use axum::{
    extract::{Form, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{config::AppState, services::lead_service};

const TWIML_EMPTY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

// O Twilio envia dezenas de campos form-encoded; só estes dois importam.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InboundSmsPayload {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

// POST /api/webhooks/sms
//
// Sempre responde TwiML vazio: o Twilio reenvia em caso de erro e o
// tratamento interno já é todo tolerante a falha.
#[utoipa::path(
    post,
    path = "/api/webhooks/sms",
    tag = "Webhooks",
    request_body(content = InboundSmsPayload, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "TwiML vazio", content_type = "text/xml")
    )
)]
pub async fn inbound_sms(
    State(state): State<AppState>,
    Form(payload): Form<InboundSmsPayload>,
) -> impl IntoResponse {
    lead_service::handle_inbound_sms(&state, &payload.from, &payload.body).await;
    ([(header::CONTENT_TYPE, "text/xml")], TWIML_EMPTY)
}
