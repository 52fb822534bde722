// src/services/lead_service.rs
//
// Orquestra o pipeline de intake: honeypot -> rate limit -> validação ->
// persistência -> análise de IA -> notificações em paralelo. As notificações
// nunca derrubam a submissão; cada falha vira log.

use axum::http::HeaderMap;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::lead::{LeadSource, LeadStatus, SubmitLeadPayload},
    services::{
        rate_limit::{client_ip, LEAD_SUBMISSIONS_PER_HOUR},
        tokens,
    },
};

#[derive(Debug)]
pub enum ApproveOutcome {
    // O link já foi usado; não reenvia nada.
    AlreadySent,
    Approved { lead_id: Uuid, full_name: String },
}

// Retorna o id do lead criado. Quando o honeypot dispara, devolve um id
// descartável para que a resposta seja indistinguível de um sucesso real.
pub async fn submit_lead(
    state: &AppState,
    headers: &HeaderMap,
    payload: SubmitLeadPayload,
) -> Result<Uuid, AppError> {
    if !payload.honeypot.trim().is_empty() {
        tracing::warn!("[Leads] honeypot preenchido — submissão descartada");
        return Ok(Uuid::new_v4());
    }

    let ip = client_ip(headers);
    if !state
        .rate_limiter
        .check("leads", &ip, LEAD_SUBMISSIONS_PER_HOUR)
        .await
    {
        return Err(AppError::RateLimited);
    }

    payload.validate()?;
    let form = payload.normalize();

    let store = state.store()?;
    let lead = store.leads.insert(&form, LeadSource::WebForm, &ip).await?;
    tracing::info!("[Leads] novo lead {} ({})", lead.id, lead.email);

    let analysis = state.ai.analyze(&form).await;
    let internal_json = serde_json::to_value(&analysis.internal)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    let prospect_summary = serde_json::to_string(&analysis.prospect)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    store
        .leads
        .apply_analysis(
            lead.id,
            analysis.internal.lead_score,
            &internal_json,
            &prospect_summary,
        )
        .await?;

    let approve_token = tokens::generate_approve_token(&state.approve_token_secret, lead.id);

    // Fan-out: as três notificações rodam juntas e independentes.
    let (internal, prospect, sms) = tokio::join!(
        state
            .mailer
            .send_internal_review(&lead, &analysis.internal, &approve_token),
        state.mailer.send_prospect_summary(&lead, &analysis.prospect),
        state.sms.send_lead_confirmation(&lead),
    );
    for (label, result) in [
        ("e-mail interno", internal),
        ("e-mail ao prospect", prospect),
        ("SMS de confirmação", sms),
    ] {
        if let Err(err) = result {
            tracing::error!("[Leads] falha no {label}: {err:#}");
        }
    }

    Ok(lead.id)
}

// Clique no link do e-mail interno. O token prende a aprovação ao lead;
// repetir o clique é inofensivo (cai em AlreadySent).
pub async fn approve_lead(
    state: &AppState,
    lead_id: Uuid,
    token: &str,
) -> Result<ApproveOutcome, AppError> {
    if !tokens::verify_approve_token(&state.approve_token_secret, lead_id, token) {
        return Err(AppError::InvalidToken);
    }

    let store = state.store()?;
    let lead = store
        .leads
        .get(lead_id)
        .await?
        .ok_or(AppError::NotFound("Lead"))?;

    if lead.status == LeadStatus::Reviewed {
        return Ok(ApproveOutcome::AlreadySent);
    }

    store.leads.set_status(lead_id, LeadStatus::Reviewed).await?;
    tracing::info!("[Approve] lead {lead_id} aprovado — follow-up detalhado liberado");

    Ok(ApproveOutcome::Approved {
        lead_id,
        full_name: lead.full_name,
    })
}

// SMS entrante (webhook do Twilio). STOP/START atualizam o opt-out por
// telefone; HELP e o resto recebem uma resposta automática.
pub async fn handle_inbound_sms(state: &AppState, from: &str, body: &str) {
    let normalized = body.trim().to_uppercase();
    tracing::info!("[Webhook SMS] de {from}: {normalized}");

    match normalized.as_str() {
        "STOP" | "STOPALL" | "UNSUBSCRIBE" => {
            if let Some(store) = &state.store {
                match store.leads.set_sms_opt_out(from, true).await {
                    Ok(n) => tracing::info!("[Webhook SMS] opt-out de {from} ({n} lead(s))"),
                    Err(err) => tracing::error!("[Webhook SMS] falha no opt-out: {err:#}"),
                }
            }
        }
        "START" | "UNSTOP" => {
            if let Some(store) = &state.store {
                match store.leads.set_sms_opt_out(from, false).await {
                    Ok(n) => tracing::info!("[Webhook SMS] opt-in de {from} ({n} lead(s))"),
                    Err(err) => tracing::error!("[Webhook SMS] falha no opt-in: {err:#}"),
                }
            }
        }
        "HELP" => {
            if let Err(err) = state.sms.send_help_reply(from).await {
                tracing::error!("[Webhook SMS] falha na resposta de HELP: {err:#}");
            }
        }
        _ => {
            if let Err(err) = state.sms.send_acknowledgment(from).await {
                tracing::error!("[Webhook SMS] falha na confirmação: {err:#}");
            }
        }
    }
}
