// src/models/project.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "milestone_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
}

// `completed_at` acompanha o status do marco: não nulo se e somente se o
// status for `completed`. Reafirmar `completed` num marco já concluído
// preserva o carimbo original em vez de reescrevê-lo.
pub fn completed_at_for(
    status: MilestoneStatus,
    previous: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if status == MilestoneStatus::Completed {
        previous.or_else(|| Some(Utc::now()))
    } else {
        None
    }
}

// --- TEMPLATE PADRÃO ---

pub struct PhaseTemplate {
    pub name: &'static str,
    pub milestones: [&'static str; 3],
}

// Todo projeto novo (criação direta ou conversão de lead) nasce com estas
// quatro fases e três marcos por fase, nesta ordem.
pub const DEFAULT_PROJECT_PHASES: [PhaseTemplate; 4] = [
    PhaseTemplate {
        name: "Discovery",
        milestones: [
            "Initial consultation completed",
            "Requirements documented",
            "Project plan approved",
        ],
    },
    PhaseTemplate {
        name: "MVP Build",
        milestones: [
            "Development environment setup",
            "Core features implemented",
            "Internal testing passed",
        ],
    },
    PhaseTemplate {
        name: "Revision",
        milestones: [
            "Client feedback collected",
            "Revisions implemented",
            "Final testing passed",
        ],
    },
    PhaseTemplate {
        name: "Launch",
        milestones: [
            "Deployment completed",
            "Client training done",
            "Project handoff complete",
        ],
    },
];

// --- LINHAS DO BANCO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_company: Option<String>,
    pub client_phone: Option<String>,
    pub project_type: Option<String>,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub linked_lead_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProjectPhase {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProjectMilestone {
    pub id: Uuid,
    pub phase_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: MilestoneStatus,
    pub sort_order: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProjectDemo {
    pub id: Uuid,
    pub project_id: Uuid,
    pub phase_id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProjectQuestion {
    pub id: Uuid,
    pub project_id: Uuid,
    pub client_email: String,
    pub question_text: String,
    pub reply_text: Option<String>,
    pub replied_by: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- VIEWS (respostas agregadas) ---

// Projeto na listagem (admin e portal), com o progresso já calculado.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub progress: u8,
    pub current_phase: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PhaseWithMilestones {
    #[serde(flatten)]
    pub phase: ProjectPhase,
    pub milestones: Vec<ProjectMilestone>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub phases: Vec<PhaseWithMilestones>,
    pub demos: Vec<ProjectDemo>,
    pub questions: Vec<ProjectQuestion>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectPayload {
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    pub client_company: Option<String>,
    pub client_phone: Option<String>,
    pub project_type: Option<String>,
    pub description: Option<String>,
    pub linked_lead_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectPayload {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_company: Option<String>,
    pub client_phone: Option<String>,
    pub project_type: Option<String>,
}

// Conversão lead -> projeto (dados do cliente vindos do admin).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConvertLeadPayload {
    pub client_name: String,
    pub client_email: String,
    pub client_company: Option<String>,
    pub client_phone: Option<String>,
    pub project_type: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPhasePayload {
    pub name: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMilestonePayload {
    pub title: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMilestonePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<MilestoneStatus>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReorderDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderMilestonePayload {
    pub direction: ReorderDirection,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDemoPayload {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub phase_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplyQuestionPayload {
    pub reply_text: String,
    pub replied_by: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AskQuestionPayload {
    pub question_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn completed_at_so_existe_com_status_completed() {
        assert!(completed_at_for(MilestoneStatus::Completed, None).is_some());
        assert_eq!(completed_at_for(MilestoneStatus::Pending, None), None);
        assert_eq!(
            completed_at_for(MilestoneStatus::InProgress, Some(Utc::now())),
            None
        );
    }

    #[test]
    fn reconcluir_preserva_o_carimbo_original() {
        let original = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            completed_at_for(MilestoneStatus::Completed, Some(original)),
            Some(original)
        );
    }

    #[test]
    fn sair_de_completed_limpa_o_carimbo() {
        let original = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            completed_at_for(MilestoneStatus::Pending, Some(original)),
            None
        );
    }
}
