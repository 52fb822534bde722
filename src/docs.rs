// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Leads (público) ---
        handlers::leads::submit_lead,
        handlers::leads::approve_lead,

        // --- Referrals (público) ---
        handlers::referrals::submit_referrals,

        // --- Webhooks ---
        handlers::webhooks::inbound_sms,

        // --- Admin: leads ---
        handlers::admin_leads::list_leads,
        handlers::admin_leads::get_lead,
        handlers::admin_leads::patch_lead,
        handlers::admin_leads::convert_lead,

        // --- Admin: referrals ---
        handlers::admin_referrals::list_referrers,

        // --- Admin: IA ---
        handlers::admin_ai::polish_reply,

        // --- Admin: projetos ---
        handlers::admin_projects::list_projects,
        handlers::admin_projects::create_project,
        handlers::admin_projects::get_project,
        handlers::admin_projects::patch_project,
        handlers::admin_projects::add_phase,
        handlers::admin_projects::add_milestone,
        handlers::admin_projects::delete_phase,
        handlers::admin_projects::patch_milestone,
        handlers::admin_projects::delete_milestone,
        handlers::admin_projects::reorder_milestone,
        handlers::admin_projects::create_demo,
        handlers::admin_projects::delete_demo,
        handlers::admin_projects::reply_question,

        // --- Admin: métricas ---
        handlers::metrics::dashboard_metrics,

        // --- Portal ---
        handlers::portal::request_magic_link,
        handlers::portal::list_projects,
        handlers::portal::project_detail,
        handlers::portal::ask_question,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::LeadScore,
            models::lead::LeadSource,
            models::lead::ComplexityLevel,
            models::lead::ComplexityAssessment,
            models::lead::AiInternalAnalysis,
            models::lead::RecommendedPhase,
            models::lead::AiProspectOutput,
            models::lead::AiAnalysisResult,
            models::lead::LeadListRow,
            models::lead::SubmitLeadPayload,
            models::lead::UpdateLeadPayload,

            // --- Referrals ---
            models::referral::Referrer,
            models::referral::Referral,
            models::referral::ReferralEntry,
            models::referral::ReferrerWithReferrals,
            models::referral::ReferralSlotPayload,
            models::referral::SubmitReferralPayload,

            // --- Projects ---
            models::project::ProjectStatus,
            models::project::MilestoneStatus,
            models::project::Project,
            models::project::ProjectPhase,
            models::project::ProjectMilestone,
            models::project::ProjectDemo,
            models::project::ProjectQuestion,
            models::project::ProjectSummary,
            models::project::PhaseWithMilestones,
            models::project::ProjectDetail,
            models::project::CreateProjectPayload,
            models::project::UpdateProjectPayload,
            models::project::ConvertLeadPayload,
            models::project::AddPhasePayload,
            models::project::AddMilestonePayload,
            models::project::UpdateMilestonePayload,
            models::project::ReorderDirection,
            models::project::ReorderMilestonePayload,
            models::project::CreateDemoPayload,
            models::project::ReplyQuestionPayload,
            models::project::AskQuestionPayload,

            // --- Payloads dos handlers ---
            handlers::webhooks::InboundSmsPayload,
            handlers::portal::MagicLinkPayload,
            handlers::admin_ai::PolishReplyPayload,
        )
    ),
    tags(
        (name = "Leads", description = "Intake público e aprovação de follow-up"),
        (name = "Referrals", description = "Formulário público de indicações"),
        (name = "Webhooks", description = "Callbacks de provedores externos"),
        (name = "Admin - Leads", description = "Gestão de leads (chave de admin)"),
        (name = "Admin - Referrals", description = "Listagem de indicações recebidas"),
        (name = "Admin - Projects", description = "Gestão de projetos, fases e marcos"),
        (name = "Admin - Metrics", description = "Métricas do dashboard"),
        (name = "Admin - AI", description = "Assistência de IA para o time"),
        (name = "Portal", description = "Portal do cliente (sessão assinada)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "portal_session",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
