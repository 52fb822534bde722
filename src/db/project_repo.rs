// src/db/project_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::project::{
        completed_at_for, MilestoneStatus, Project, ProjectDemo, ProjectMilestone, ProjectPhase,
        ProjectQuestion, ProjectStatus, ReorderDirection, UpdateMilestonePayload,
        UpdateProjectPayload,
    },
};

// Dados de criação de projeto, já normalizados pelo serviço.
#[derive(Debug)]
pub struct NewProject<'a> {
    pub name: &'a str,
    pub client_name: &'a str,
    pub client_email: &'a str,
    pub client_company: Option<&'a str>,
    pub client_phone: Option<&'a str>,
    pub project_type: Option<&'a str>,
    pub description: Option<&'a str>,
    pub linked_lead_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PROJETOS
    // =========================================================================

    pub async fn create(&self, new: &NewProject<'_>) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO projects (
                name, client_name, client_email, client_company,
                client_phone, project_type, description, linked_lead_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(new.name)
        .bind(new.client_name)
        .bind(new.client_email)
        .bind(new.client_company)
        .bind(new.client_phone)
        .bind(new.project_type)
        .bind(new.description)
        .bind(new.linked_lead_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    // O portal só enxerga projetos cujo client_email bate com a sessão.
    pub async fn get_for_client(
        &self,
        id: Uuid,
        client_email: &str,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE id = $1 AND client_email = $2",
        )
        .bind(id)
        .bind(client_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    pub async fn list_all(&self) -> Result<Vec<Project>, AppError> {
        let projects =
            sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(projects)
    }

    pub async fn list_for_client(&self, client_email: &str) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE client_email = $1
              AND status IN ('draft', 'in_progress', 'paused', 'completed')
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_email)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn client_has_projects(&self, client_email: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE client_email = $1)")
                .bind(client_email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn update_fields(
        &self,
        id: Uuid,
        updates: &UpdateProjectPayload,
    ) -> Result<(), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = now()");
        if let Some(name) = &updates.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(status) = updates.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(description) = &updates.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(client_name) = &updates.client_name {
            qb.push(", client_name = ").push_bind(client_name);
        }
        if let Some(client_email) = &updates.client_email {
            qb.push(", client_email = ").push_bind(client_email);
        }
        if let Some(client_company) = &updates.client_company {
            qb.push(", client_company = ").push_bind(client_company);
        }
        if let Some(client_phone) = &updates.client_phone {
            qb.push(", client_phone = ").push_bind(client_phone);
        }
        if let Some(project_type) = &updates.project_type {
            qb.push(", project_type = ").push_bind(project_type);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    pub async fn active_projects(&self) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE status IN ('draft', 'in_progress', 'paused')",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    // =========================================================================
    //  FASES E MARCOS
    // =========================================================================

    pub async fn insert_phase(
        &self,
        project_id: Uuid,
        name: &str,
        sort_order: i32,
    ) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO project_phases (project_id, name, sort_order) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(project_id)
        .bind(name)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn next_phase_sort(&self, project_id: Uuid) -> Result<i32, AppError> {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM project_phases WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(next)
    }

    pub async fn insert_milestone(
        &self,
        phase_id: Uuid,
        project_id: Uuid,
        title: &str,
        sort_order: i32,
    ) -> Result<ProjectMilestone, AppError> {
        let milestone = sqlx::query_as::<_, ProjectMilestone>(
            r#"
            INSERT INTO project_milestones (phase_id, project_id, title, sort_order)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(phase_id)
        .bind(project_id)
        .bind(title)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await?;
        Ok(milestone)
    }

    pub async fn phases(&self, project_id: Uuid) -> Result<Vec<ProjectPhase>, AppError> {
        let phases = sqlx::query_as::<_, ProjectPhase>(
            "SELECT * FROM project_phases WHERE project_id = $1 ORDER BY sort_order ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(phases)
    }

    pub async fn milestones(&self, project_id: Uuid) -> Result<Vec<ProjectMilestone>, AppError> {
        let milestones = sqlx::query_as::<_, ProjectMilestone>(
            "SELECT * FROM project_milestones WHERE project_id = $1 ORDER BY sort_order ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(milestones)
    }

    pub async fn get_milestone(&self, id: Uuid) -> Result<Option<ProjectMilestone>, AppError> {
        let milestone =
            sqlx::query_as::<_, ProjectMilestone>("SELECT * FROM project_milestones WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(milestone)
    }

    // Atualização parcial do marco. `completed_at` acompanha o status via
    // `completed_at_for`: reafirmar `completed` mantém o carimbo anterior.
    pub async fn update_milestone(
        &self,
        id: Uuid,
        updates: &UpdateMilestonePayload,
        previous_completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<ProjectMilestone>, AppError> {
        if updates.title.is_none()
            && updates.description.is_none()
            && updates.status.is_none()
            && updates.sort_order.is_none()
        {
            return self.get_milestone(id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE project_milestones SET ");
        let mut field = qb.separated(", ");
        if let Some(title) = &updates.title {
            field.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = &updates.description {
            field.push("description = ").push_bind_unseparated(description);
        }
        if let Some(status) = updates.status {
            field.push("status = ").push_bind_unseparated(status);
            field
                .push("completed_at = ")
                .push_bind_unseparated(completed_at_for(status, previous_completed_at));
        }
        if let Some(sort_order) = updates.sort_order {
            field.push("sort_order = ").push_bind_unseparated(sort_order);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        let milestone = qb
            .build_query_as::<ProjectMilestone>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(milestone)
    }

    pub async fn delete_milestone(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM project_milestones WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // A deleção da fase cai em cascata sobre os marcos (FK ON DELETE CASCADE).
    pub async fn delete_phase(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM project_phases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // Vizinho imediato dentro da mesma fase, na direção pedida.
    pub async fn neighbor_milestone(
        &self,
        phase_id: Uuid,
        sort_order: i32,
        direction: ReorderDirection,
    ) -> Result<Option<ProjectMilestone>, AppError> {
        let sql = match direction {
            ReorderDirection::Up => {
                "SELECT * FROM project_milestones \
                 WHERE phase_id = $1 AND sort_order < $2 \
                 ORDER BY sort_order DESC LIMIT 1"
            }
            ReorderDirection::Down => {
                "SELECT * FROM project_milestones \
                 WHERE phase_id = $1 AND sort_order > $2 \
                 ORDER BY sort_order ASC LIMIT 1"
            }
        };
        let neighbor = sqlx::query_as::<_, ProjectMilestone>(sql)
            .bind(phase_id)
            .bind(sort_order)
            .fetch_optional(&self.pool)
            .await?;
        Ok(neighbor)
    }

    pub async fn set_milestone_sort(&self, id: Uuid, sort_order: i32) -> Result<(), AppError> {
        sqlx::query("UPDATE project_milestones SET sort_order = $2 WHERE id = $1")
            .bind(id)
            .bind(sort_order)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Rollup (project_id, status) de todos os marcos, para calcular o
    // progresso das listagens sem carregar cada projeto.
    pub async fn milestone_rollup(&self) -> Result<Vec<(Uuid, MilestoneStatus)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, MilestoneStatus)>(
            "SELECT project_id, status FROM project_milestones",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn phases_rollup(&self) -> Result<Vec<ProjectPhase>, AppError> {
        let rows = sqlx::query_as::<_, ProjectPhase>(
            "SELECT * FROM project_phases ORDER BY project_id, sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Fases com marco em andamento, por projeto (métricas do dashboard).
    pub async fn in_progress_phases(
        &self,
        project_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, String, i32)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, String, i32)>(
            r#"
            SELECT m.project_id, p.name, p.sort_order
            FROM project_milestones m
            JOIN project_phases p ON p.id = m.phase_id
            WHERE m.status = 'in_progress' AND m.project_id = ANY($1)
            ORDER BY m.project_id, p.sort_order ASC
            "#,
        )
        .bind(project_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  DEMOS
    // =========================================================================

    pub async fn insert_demo(
        &self,
        project_id: Uuid,
        title: &str,
        url: &str,
        description: Option<&str>,
        phase_id: Option<Uuid>,
    ) -> Result<ProjectDemo, AppError> {
        let demo = sqlx::query_as::<_, ProjectDemo>(
            r#"
            INSERT INTO project_demos (project_id, title, url, description, phase_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(title)
        .bind(url)
        .bind(description)
        .bind(phase_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(demo)
    }

    pub async fn demos(&self, project_id: Uuid) -> Result<Vec<ProjectDemo>, AppError> {
        let demos = sqlx::query_as::<_, ProjectDemo>(
            "SELECT * FROM project_demos WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(demos)
    }

    pub async fn delete_demo(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM project_demos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PERGUNTAS DO CLIENTE
    // =========================================================================

    pub async fn insert_question(
        &self,
        project_id: Uuid,
        client_email: &str,
        question_text: &str,
    ) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO project_questions (project_id, client_email, question_text)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(project_id)
        .bind(client_email)
        .bind(question_text)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    // No portal a lista é filtrada pelo e-mail da sessão; no admin vem tudo.
    pub async fn questions(
        &self,
        project_id: Uuid,
        client_email: Option<&str>,
    ) -> Result<Vec<ProjectQuestion>, AppError> {
        let questions = match client_email {
            Some(email) => {
                sqlx::query_as::<_, ProjectQuestion>(
                    "SELECT * FROM project_questions \
                     WHERE project_id = $1 AND client_email = $2 \
                     ORDER BY created_at DESC",
                )
                .bind(project_id)
                .bind(email)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProjectQuestion>(
                    "SELECT * FROM project_questions WHERE project_id = $1 ORDER BY created_at DESC",
                )
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(questions)
    }

    pub async fn get_question(&self, id: Uuid) -> Result<Option<ProjectQuestion>, AppError> {
        let question =
            sqlx::query_as::<_, ProjectQuestion>("SELECT * FROM project_questions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(question)
    }

    // `replied_at` acompanha `reply_text`: os dois são escritos juntos.
    pub async fn reply_question(
        &self,
        id: Uuid,
        reply_text: &str,
        replied_by: Option<&str>,
    ) -> Result<Option<ProjectQuestion>, AppError> {
        let question = sqlx::query_as::<_, ProjectQuestion>(
            r#"
            UPDATE project_questions
            SET reply_text = $2, replied_by = $3, replied_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reply_text)
        .bind(replied_by)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }
}
