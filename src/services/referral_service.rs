// src/services/referral_service.rs
//
// Pipeline de indicações: rate limit -> honeypot -> validação -> persistência
// -> fan-out de e-mails (um warm intro por indicado + resumo para o time +
// agradecimento ao indicador). Nenhum e-mail derruba a submissão.

use axum::http::HeaderMap;
use futures::future::join_all;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::referral::SubmitReferralPayload,
    services::rate_limit::{client_ip, REFERRAL_SUBMISSIONS_PER_HOUR},
};

// Retorna o id do indicador. Honeypot devolve um id descartável, igual ao
// pipeline de leads.
pub async fn submit_referrals(
    state: &AppState,
    headers: &HeaderMap,
    payload: SubmitReferralPayload,
) -> Result<Uuid, AppError> {
    if !payload.honeypot.trim().is_empty() {
        tracing::warn!("[Referrals] honeypot preenchido — submissão descartada");
        return Ok(Uuid::new_v4());
    }

    let ip = client_ip(headers);
    if !state
        .rate_limiter
        .check("referrals", &ip, REFERRAL_SUBMISSIONS_PER_HOUR)
        .await
    {
        return Err(AppError::RateLimited);
    }

    let submission = payload
        .validate_and_normalize()
        .map_err(AppError::InvalidInput)?;

    let store = state.store()?;
    let referrer_id = store.referrals.insert_submission(&submission, &ip).await?;
    tracing::info!(
        "[Referrals] {} indicou {} contato(s) ({referrer_id})",
        submission.referrer_email,
        submission.referrals.len(),
    );

    // Um warm intro por indicado, mais o resumo do time e o agradecimento.
    let intros = join_all(
        submission
            .referrals
            .iter()
            .map(|contact| state.mailer.send_referral_warm_intro(&submission, contact)),
    );
    let (intro_results, team, thanks) = tokio::join!(
        intros,
        state.mailer.send_referral_team_summary(&submission),
        state.mailer.send_referrer_thank_you(&submission),
    );
    for (contact, result) in submission.referrals.iter().zip(intro_results) {
        if let Err(err) = result {
            tracing::error!("[Referrals] falha no warm intro para {}: {err:#}", contact.email);
        }
    }
    if let Err(err) = team {
        tracing::error!("[Referrals] falha no resumo para o time: {err:#}");
    }
    if let Err(err) = thanks {
        tracing::error!("[Referrals] falha no agradecimento ao indicador: {err:#}");
    }

    Ok(referrer_id)
}
