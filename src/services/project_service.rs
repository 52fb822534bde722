// src/services/project_service.rs
//
// Modelo de progresso e ciclo de vida dos projetos: instanciação do template
// padrão, conversão de lead, agregação das views (admin e portal) e as
// notificações do portal. As regras puras (progresso, fase atual) ficam em
// funções livres para poderem ser testadas sem banco.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::{AppState, Store},
    models::{
        lead::LeadStatus,
        project::{
            AddMilestonePayload, AddPhasePayload, AskQuestionPayload, ConvertLeadPayload,
            CreateDemoPayload, CreateProjectPayload, MilestoneStatus, PhaseWithMilestones,
            Project, ProjectDetail, ProjectMilestone, ProjectPhase, ProjectSummary,
            ReorderDirection, ReplyQuestionPayload, UpdateMilestonePayload,
            DEFAULT_PROJECT_PHASES,
        },
    },
    services::tokens,
};

// =============================================================================
//  REGRAS PURAS
// =============================================================================

// Percentual inteiro arredondado; 0 quando o projeto não tem marcos.
pub fn progress_pct(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u8
}

// A "fase atual" exibida nas listagens: a primeira fase (por sort_order) com
// um marco em andamento; com tudo concluído, "Complete"; senão a primeira
// fase do projeto.
pub fn current_phase_label(
    first_phase: Option<&str>,
    in_progress_phase: Option<&str>,
    completed: usize,
    total: usize,
) -> String {
    if let Some(phase) = in_progress_phase {
        return phase.to_string();
    }
    if total > 0 && completed == total {
        return "Complete".to_string();
    }
    first_phase.unwrap_or("Discovery").to_string()
}

pub fn current_phase_name(phases: &[ProjectPhase], milestones: &[ProjectMilestone]) -> String {
    let in_progress_phase = phases
        .iter()
        .find(|phase| {
            milestones
                .iter()
                .any(|m| m.phase_id == phase.id && m.status == MilestoneStatus::InProgress)
        })
        .map(|phase| phase.name.as_str());
    let completed = milestones
        .iter()
        .filter(|m| m.status == MilestoneStatus::Completed)
        .count();
    current_phase_label(
        phases.first().map(|p| p.name.as_str()),
        in_progress_phase,
        completed,
        milestones.len(),
    )
}

pub fn summarize(
    project: Project,
    phases: &[ProjectPhase],
    milestones: &[ProjectMilestone],
) -> ProjectSummary {
    let completed = milestones
        .iter()
        .filter(|m| m.status == MilestoneStatus::Completed)
        .count();
    ProjectSummary {
        progress: progress_pct(completed, milestones.len()),
        current_phase: current_phase_name(phases, milestones),
        project,
    }
}

// =============================================================================
//  CRIAÇÃO E CONVERSÃO
// =============================================================================

// Instancia o template padrão (4 fases x 3 marcos). Uma fase que falha é
// pulada junto com seus marcos, mas o laço continua: melhor um projeto com
// template parcial do que nenhum projeto.
async fn instantiate_template(store: &Store, project_id: Uuid) {
    for (phase_idx, template) in DEFAULT_PROJECT_PHASES.iter().enumerate() {
        let phase_id = match store
            .projects
            .insert_phase(project_id, template.name, phase_idx as i32 + 1)
            .await
        {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    "[Projects] falha ao criar a fase '{}' de {project_id}: {err:#}",
                    template.name
                );
                continue;
            }
        };
        for (m_idx, title) in template.milestones.iter().enumerate() {
            if let Err(err) = store
                .projects
                .insert_milestone(phase_id, project_id, title, m_idx as i32 + 1)
                .await
            {
                tracing::error!(
                    "[Projects] falha ao criar o marco '{title}' de {project_id}: {err:#}"
                );
            }
        }
    }
}

pub async fn create_project(
    state: &AppState,
    payload: CreateProjectPayload,
) -> Result<Uuid, AppError> {
    if payload.name.trim().is_empty()
        || payload.client_name.trim().is_empty()
        || payload.client_email.trim().is_empty()
    {
        return Err(AppError::InvalidInput(
            "name, client_name and client_email are required".to_string(),
        ));
    }

    let store = state.store()?;
    let client_email = payload.client_email.trim().to_lowercase();
    let id = store
        .projects
        .create(&crate::db::project_repo::NewProject {
            name: payload.name.trim(),
            client_name: payload.client_name.trim(),
            client_email: &client_email,
            client_company: payload.client_company.as_deref(),
            client_phone: payload.client_phone.as_deref(),
            project_type: payload.project_type.as_deref(),
            description: payload.description.as_deref(),
            linked_lead_id: payload.linked_lead_id,
        })
        .await?;

    instantiate_template(store, id).await;
    tracing::info!("[Projects] projeto {id} criado para {client_email}");
    Ok(id)
}

// Conversão lead -> projeto: projeto em draft com o template padrão, lead
// marcado como `converted` e boas-vindas ao cliente.
pub async fn convert_lead(
    state: &AppState,
    lead_id: Uuid,
    payload: ConvertLeadPayload,
) -> Result<Uuid, AppError> {
    let store = state.store()?;
    let lead = store
        .leads
        .get(lead_id)
        .await?
        .ok_or(AppError::NotFound("Lead"))?;
    if !lead.status.can_transition(LeadStatus::Converted) {
        return Err(AppError::InvalidInput(
            "Lead cannot be converted from its current status".to_string(),
        ));
    }

    let name = match payload.client_company.as_deref().filter(|c| !c.is_empty()) {
        Some(company) => format!("{company} Project"),
        None => format!("{} Project", payload.client_name),
    };
    let client_email = payload.client_email.trim().to_lowercase();
    let project_id = store
        .projects
        .create(&crate::db::project_repo::NewProject {
            name: &name,
            client_name: payload.client_name.trim(),
            client_email: &client_email,
            client_company: payload.client_company.as_deref(),
            client_phone: payload.client_phone.as_deref(),
            project_type: payload.project_type.as_deref(),
            description: None,
            linked_lead_id: Some(lead_id),
        })
        .await?;

    instantiate_template(store, project_id).await;
    store.leads.set_status(lead_id, LeadStatus::Converted).await?;
    tracing::info!("[Projects] lead {lead_id} convertido no projeto {project_id}");

    if let Ok(Some(project)) = store.projects.get(project_id).await {
        if let Err(err) = state.mailer.send_welcome(&project).await {
            tracing::error!("[Projects] falha no e-mail de boas-vindas: {err:#}");
        }
    }

    Ok(project_id)
}

// =============================================================================
//  VIEWS AGREGADAS
// =============================================================================

// Listagem do admin: um rollup global de marcos e fases em vez de uma
// consulta por projeto.
pub async fn list_admin(state: &AppState) -> Result<Vec<ProjectSummary>, AppError> {
    let store = state.store()?;
    let projects = store.projects.list_all().await?;

    let mut counts: HashMap<Uuid, (usize, usize)> = HashMap::new();
    for (project_id, status) in store.projects.milestone_rollup().await? {
        let entry = counts.entry(project_id).or_default();
        entry.1 += 1;
        if status == MilestoneStatus::Completed {
            entry.0 += 1;
        }
    }

    // phases_rollup vem ordenado por (project_id, sort_order): o primeiro
    // visto de cada projeto é a primeira fase dele.
    let mut first_phase: HashMap<Uuid, String> = HashMap::new();
    for phase in store.projects.phases_rollup().await? {
        first_phase.entry(phase.project_id).or_insert(phase.name);
    }

    let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
    let mut in_progress: HashMap<Uuid, String> = HashMap::new();
    for (project_id, phase_name, _) in store.projects.in_progress_phases(&ids).await? {
        in_progress.entry(project_id).or_insert(phase_name);
    }

    Ok(projects
        .into_iter()
        .map(|project| {
            let (completed, total) = counts.get(&project.id).copied().unwrap_or((0, 0));
            ProjectSummary {
                progress: progress_pct(completed, total),
                current_phase: current_phase_label(
                    first_phase.get(&project.id).map(String::as_str),
                    in_progress.get(&project.id).map(String::as_str),
                    completed,
                    total,
                ),
                project,
            }
        })
        .collect())
}

// O portal lista poucos projetos por cliente; aqui a consulta por projeto
// não pesa.
pub async fn list_for_client(
    state: &AppState,
    client_email: &str,
) -> Result<Vec<ProjectSummary>, AppError> {
    let store = state.store()?;
    let projects = store.projects.list_for_client(client_email).await?;

    let mut summaries = Vec::with_capacity(projects.len());
    for project in projects {
        let phases = store.projects.phases(project.id).await?;
        let milestones = store.projects.milestones(project.id).await?;
        summaries.push(summarize(project, &phases, &milestones));
    }
    Ok(summaries)
}

async fn assemble_detail(
    store: &Store,
    project: Project,
    client_email: Option<&str>,
) -> Result<ProjectDetail, AppError> {
    let phases = store.projects.phases(project.id).await?;
    let milestones = store.projects.milestones(project.id).await?;
    let demos = store.projects.demos(project.id).await?;
    let questions = store.projects.questions(project.id, client_email).await?;

    // `milestones` já vem ordenado por sort_order; o agrupamento preserva.
    let phases = phases
        .into_iter()
        .map(|phase| {
            let own = milestones
                .iter()
                .filter(|m| m.phase_id == phase.id)
                .cloned()
                .collect();
            PhaseWithMilestones {
                phase,
                milestones: own,
            }
        })
        .collect();

    Ok(ProjectDetail {
        project,
        phases,
        demos,
        questions,
    })
}

pub async fn admin_detail(state: &AppState, project_id: Uuid) -> Result<ProjectDetail, AppError> {
    let store = state.store()?;
    let project = store
        .projects
        .get(project_id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    assemble_detail(store, project, None).await
}

// O portal só enxerga o próprio projeto e as próprias perguntas.
pub async fn client_detail(
    state: &AppState,
    project_id: Uuid,
    client_email: &str,
) -> Result<ProjectDetail, AppError> {
    let store = state.store()?;
    let project = store
        .projects
        .get_for_client(project_id, client_email)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    assemble_detail(store, project, Some(client_email)).await
}

// =============================================================================
//  FASES E MARCOS
// =============================================================================

pub async fn add_phase(
    state: &AppState,
    project_id: Uuid,
    payload: AddPhasePayload,
) -> Result<Uuid, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Phase name is required".to_string()));
    }
    let store = state.store()?;
    store
        .projects
        .get(project_id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    let sort_order = match payload.sort_order {
        Some(order) => order,
        None => store.projects.next_phase_sort(project_id).await?,
    };
    let id = store
        .projects
        .insert_phase(project_id, payload.name.trim(), sort_order)
        .await?;
    Ok(id)
}

pub async fn add_milestone(
    state: &AppState,
    project_id: Uuid,
    phase_id: Uuid,
    payload: AddMilestonePayload,
) -> Result<ProjectMilestone, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Milestone title is required".to_string(),
        ));
    }
    let store = state.store()?;
    let phases = store.projects.phases(project_id).await?;
    let phase = phases
        .iter()
        .find(|p| p.id == phase_id)
        .ok_or(AppError::NotFound("Phase"))?;

    let sort_order = match payload.sort_order {
        Some(order) => order,
        None => {
            let milestones = store.projects.milestones(project_id).await?;
            milestones
                .iter()
                .filter(|m| m.phase_id == phase.id)
                .map(|m| m.sort_order)
                .max()
                .unwrap_or(0)
                + 1
        }
    };
    store
        .projects
        .insert_milestone(phase_id, project_id, payload.title.trim(), sort_order)
        .await
}

pub async fn delete_phase(
    state: &AppState,
    project_id: Uuid,
    phase_id: Uuid,
) -> Result<(), AppError> {
    let store = state.store()?;
    let phases = store.projects.phases(project_id).await?;
    if !phases.iter().any(|p| p.id == phase_id) {
        return Err(AppError::NotFound("Phase"));
    }
    // Os marcos caem junto (FK em cascata); sem renumeração das fases restantes.
    store.projects.delete_phase(phase_id).await?;
    Ok(())
}

// Atualização parcial do marco. Entrar em `completed` dispara o e-mail de
// progresso ao cliente; o e-mail nunca falha a operação.
pub async fn update_milestone(
    state: &AppState,
    project_id: Uuid,
    milestone_id: Uuid,
    payload: UpdateMilestonePayload,
) -> Result<ProjectMilestone, AppError> {
    let store = state.store()?;
    let before = store
        .projects
        .get_milestone(milestone_id)
        .await?
        .filter(|m| m.project_id == project_id)
        .ok_or(AppError::NotFound("Milestone"))?;

    let updated = store
        .projects
        .update_milestone(milestone_id, &payload, before.completed_at)
        .await?
        .ok_or(AppError::NotFound("Milestone"))?;

    let entered_completed = before.status != MilestoneStatus::Completed
        && updated.status == MilestoneStatus::Completed;
    if entered_completed {
        if let Ok(Some(project)) = store.projects.get(project_id).await {
            let milestones = store.projects.milestones(project_id).await.unwrap_or_default();
            let completed = milestones
                .iter()
                .filter(|m| m.status == MilestoneStatus::Completed)
                .count();
            let progress = progress_pct(completed, milestones.len());
            if let Err(err) = state
                .mailer
                .send_milestone_completed(&project, &updated.title, progress)
                .await
            {
                tracing::error!("[Projects] falha no e-mail de marco concluído: {err:#}");
            }
        }
    }

    Ok(updated)
}

pub async fn delete_milestone(
    state: &AppState,
    project_id: Uuid,
    milestone_id: Uuid,
) -> Result<(), AppError> {
    let store = state.store()?;
    store
        .projects
        .get_milestone(milestone_id)
        .await?
        .filter(|m| m.project_id == project_id)
        .ok_or(AppError::NotFound("Milestone"))?;
    store.projects.delete_milestone(milestone_id).await?;
    Ok(())
}

// Troca de sort_order com o vizinho imediato dentro da mesma fase. Na borda
// (primeiro subindo, último descendo) a operação é um no-op.
pub async fn reorder_milestone(
    state: &AppState,
    project_id: Uuid,
    milestone_id: Uuid,
    direction: ReorderDirection,
) -> Result<(), AppError> {
    let store = state.store()?;
    let milestone = store
        .projects
        .get_milestone(milestone_id)
        .await?
        .filter(|m| m.project_id == project_id)
        .ok_or(AppError::NotFound("Milestone"))?;

    let Some(neighbor) = store
        .projects
        .neighbor_milestone(milestone.phase_id, milestone.sort_order, direction)
        .await?
    else {
        return Ok(());
    };

    store
        .projects
        .set_milestone_sort(milestone.id, neighbor.sort_order)
        .await?;
    store
        .projects
        .set_milestone_sort(neighbor.id, milestone.sort_order)
        .await?;
    Ok(())
}

// =============================================================================
//  DEMOS E PERGUNTAS
// =============================================================================

pub async fn create_demo(
    state: &AppState,
    project_id: Uuid,
    payload: CreateDemoPayload,
) -> Result<crate::models::project::ProjectDemo, AppError> {
    if payload.title.trim().is_empty() || payload.url.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Demo title and url are required".to_string(),
        ));
    }
    let store = state.store()?;
    let project = store
        .projects
        .get(project_id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    let demo = store
        .projects
        .insert_demo(
            project_id,
            payload.title.trim(),
            payload.url.trim(),
            payload.description.as_deref(),
            payload.phase_id,
        )
        .await?;

    if let Err(err) = state.mailer.send_demo_shared(&project, &demo).await {
        tracing::error!("[Projects] falha no e-mail de demo: {err:#}");
    }
    Ok(demo)
}

pub async fn delete_demo(
    state: &AppState,
    project_id: Uuid,
    demo_id: Uuid,
) -> Result<(), AppError> {
    let store = state.store()?;
    let demos = store.projects.demos(project_id).await?;
    if !demos.iter().any(|d| d.id == demo_id) {
        return Err(AppError::NotFound("Demo"));
    }
    store.projects.delete_demo(demo_id).await?;
    Ok(())
}

pub async fn reply_question(
    state: &AppState,
    project_id: Uuid,
    question_id: Uuid,
    payload: ReplyQuestionPayload,
) -> Result<crate::models::project::ProjectQuestion, AppError> {
    if payload.reply_text.trim().is_empty() {
        return Err(AppError::InvalidInput("Reply text is required".to_string()));
    }
    let store = state.store()?;
    let project = store
        .projects
        .get(project_id)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    store
        .projects
        .get_question(question_id)
        .await?
        .filter(|q| q.project_id == project_id)
        .ok_or(AppError::NotFound("Question"))?;

    let question = store
        .projects
        .reply_question(
            question_id,
            payload.reply_text.trim(),
            payload.replied_by.as_deref(),
        )
        .await?
        .ok_or(AppError::NotFound("Question"))?;

    if let Err(err) = state.mailer.send_question_replied(&project, &question).await {
        tracing::error!("[Projects] falha no e-mail de resposta: {err:#}");
    }
    Ok(question)
}

// Pergunta vinda do portal; a sessão prende a pergunta ao e-mail do cliente.
pub async fn ask_question(
    state: &AppState,
    project_id: Uuid,
    client_email: &str,
    payload: AskQuestionPayload,
) -> Result<Uuid, AppError> {
    let text = payload.question_text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput(
            "Question text is required".to_string(),
        ));
    }
    let store = state.store()?;
    let project = store
        .projects
        .get_for_client(project_id, client_email)
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    let id = store
        .projects
        .insert_question(project_id, client_email, text)
        .await?;

    if let Err(err) = state.mailer.send_client_question_alert(&project, text).await {
        tracing::error!("[Projects] falha no alerta de pergunta ao time: {err:#}");
    }
    Ok(id)
}

// =============================================================================
//  ACESSO AO PORTAL
// =============================================================================

// Magic link: só sai se o e-mail for cliente de pelo menos um projeto.
pub async fn request_magic_link(state: &AppState, email: &str) -> Result<(), AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::InvalidInput("Email is required".to_string()));
    }

    let store = state.store()?;
    if !store.projects.client_has_projects(&email).await? {
        return Err(AppError::NotFound("Projects for this email"));
    }

    let session = tokens::generate_portal_session(&state.approve_token_secret, &email);
    let link = format!("{}/portal?session={}", state.site_url, session);
    state
        .mailer
        .send_magic_link(&email, &link)
        .await
        .map_err(AppError::InternalServerError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn phase(id: Uuid, project_id: Uuid, name: &str, sort: i32) -> ProjectPhase {
        ProjectPhase {
            id,
            project_id,
            name: name.into(),
            sort_order: sort,
            created_at: Utc::now(),
        }
    }

    fn milestone(phase_id: Uuid, project_id: Uuid, status: MilestoneStatus) -> ProjectMilestone {
        ProjectMilestone {
            id: Uuid::new_v4(),
            phase_id,
            project_id,
            title: "m".into(),
            description: None,
            status,
            sort_order: 1,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn template_padrao_tem_quatro_fases_de_tres_marcos() {
        assert_eq!(DEFAULT_PROJECT_PHASES.len(), 4);
        for template in &DEFAULT_PROJECT_PHASES {
            assert_eq!(template.milestones.len(), 3);
        }
        assert_eq!(DEFAULT_PROJECT_PHASES[0].name, "Discovery");
        assert_eq!(DEFAULT_PROJECT_PHASES[3].name, "Launch");
    }

    #[test]
    fn progresso_arredonda_e_trata_o_vazio() {
        assert_eq!(progress_pct(0, 0), 0);
        assert_eq!(progress_pct(0, 12), 0);
        assert_eq!(progress_pct(12, 12), 100);
        assert_eq!(progress_pct(1, 12), 8); // 8.33 -> 8
        assert_eq!(progress_pct(5, 12), 42); // 41.67 -> 42
        assert_eq!(progress_pct(1, 3), 33);
        assert_eq!(progress_pct(2, 3), 67);
    }

    #[test]
    fn progresso_e_monotonico_no_numero_de_concluidos() {
        let mut last = 0;
        for completed in 0..=12 {
            let p = progress_pct(completed, 12);
            assert!(p >= last);
            last = p;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn fase_atual_prefere_a_fase_com_marco_em_andamento() {
        let project_id = Uuid::new_v4();
        let p1 = phase(Uuid::new_v4(), project_id, "Discovery", 1);
        let p2 = phase(Uuid::new_v4(), project_id, "MVP Build", 2);
        let phases = vec![p1.clone(), p2.clone()];

        let milestones = vec![
            milestone(p1.id, project_id, MilestoneStatus::Completed),
            milestone(p2.id, project_id, MilestoneStatus::InProgress),
        ];
        assert_eq!(current_phase_name(&phases, &milestones), "MVP Build");
    }

    #[test]
    fn fase_atual_sem_andamento_cai_na_primeira_fase() {
        let project_id = Uuid::new_v4();
        let p1 = phase(Uuid::new_v4(), project_id, "Discovery", 1);
        let p2 = phase(Uuid::new_v4(), project_id, "MVP Build", 2);
        let phases = vec![p1.clone(), p2.clone()];

        let milestones = vec![
            milestone(p1.id, project_id, MilestoneStatus::Pending),
            milestone(p2.id, project_id, MilestoneStatus::Pending),
        ];
        assert_eq!(current_phase_name(&phases, &milestones), "Discovery");
    }

    #[test]
    fn projeto_todo_concluido_reporta_complete() {
        let project_id = Uuid::new_v4();
        let p1 = phase(Uuid::new_v4(), project_id, "Discovery", 1);
        let phases = vec![p1.clone()];
        let milestones = vec![
            milestone(p1.id, project_id, MilestoneStatus::Completed),
            milestone(p1.id, project_id, MilestoneStatus::Completed),
        ];
        assert_eq!(current_phase_name(&phases, &milestones), "Complete");
    }

    #[test]
    fn sem_fases_nem_marcos_usa_o_rotulo_padrao() {
        assert_eq!(current_phase_name(&[], &[]), "Discovery");
        assert_eq!(current_phase_label(None, None, 0, 0), "Discovery");
    }
}
