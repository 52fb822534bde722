// src/handlers/metrics.rs

use std::collections::HashMap;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{Datelike, Duration, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// GET /api/admin/metrics
//
// Sem banco configurado o dashboard recebe o payload zerado em vez de 503,
// para não quebrar a tela inteira do admin.
#[utoipa::path(
    get,
    path = "/api/admin/metrics",
    tag = "Admin - Metrics",
    params(("x-admin-key" = String, Header, description = "Chave do admin")),
    responses((status = 200, description = "Métricas do dashboard"))
)]
pub async fn dashboard_metrics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let Some(store) = &state.store else {
        return Ok(Json(json!({
            "leadsThisWeek": 0,
            "leadsLastWeek": 0,
            "leadsThisMonth": 0,
            "sourceBreakdown": { "web_form": 0, "referral": 0, "vapi": 0 },
            "activeProjects": 0,
            "projectsByPhase": { "Discovery": 0, "MVP Build": 0, "Revision": 0, "Launch": 0 },
        })));
    };

    // Semana começando no domingo, meia-noite UTC.
    let now = Utc::now();
    let today = now.date_naive();
    let week_start = (today - Duration::days(today.weekday().num_days_from_sunday() as i64))
        .and_time(NaiveTime::MIN)
        .and_utc();
    let last_week_start = week_start - Duration::days(7);
    let month_start = today
        .with_day(1)
        .unwrap_or(today)
        .and_time(NaiveTime::MIN)
        .and_utc();

    let (this_week, last_week, this_month, sources, active) = tokio::join!(
        store.leads.count_created_between(week_start, None),
        store
            .leads
            .count_created_between(last_week_start, Some(week_start)),
        store.leads.count_created_between(month_start, None),
        store.leads.source_counts(),
        store.projects.active_projects(),
    );
    let (this_week, last_week, this_month, sources, active) =
        (this_week?, last_week?, this_month?, sources?, active?);

    let mut source_breakdown = json!({ "web_form": 0, "referral": 0, "vapi": 0 });
    for (source, count) in sources {
        let key = match source {
            crate::models::lead::LeadSource::WebForm => "web_form",
            crate::models::lead::LeadSource::Referral => "referral",
            crate::models::lead::LeadSource::Vapi => "vapi",
        };
        source_breakdown[key] = json!(count);
    }

    // Fase "corrente" de cada projeto ativo: a primeira (por sort_order) com
    // marco em andamento.
    let active_ids: Vec<Uuid> = active.iter().map(|p| p.id).collect();
    let mut current_phase: HashMap<Uuid, String> = HashMap::new();
    for (project_id, phase_name, _) in store.projects.in_progress_phases(&active_ids).await? {
        current_phase.entry(project_id).or_insert(phase_name);
    }
    let mut projects_by_phase = json!({ "Discovery": 0, "MVP Build": 0, "Revision": 0, "Launch": 0 });
    for phase_name in current_phase.values() {
        if let Some(count) = projects_by_phase.get(phase_name.as_str()).and_then(|v| v.as_i64()) {
            projects_by_phase[phase_name.as_str()] = json!(count + 1);
        }
    }

    Ok(Json(json!({
        "leadsThisWeek": this_week,
        "leadsLastWeek": last_week,
        "leadsThisMonth": this_month,
        "sourceBreakdown": source_breakdown,
        "activeProjects": active_ids.len(),
        "projectsByPhase": projects_by_phase,
    })))
}
