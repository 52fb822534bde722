// src/db/lead_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadFormData, LeadListRow, LeadScore, LeadSource, LeadStatus},
};

// Filtros da listagem do admin. Tudo opcional; paginação 1-based.
#[derive(Debug, Default)]
pub struct LeadFilters {
    pub search: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<LeadScore>,
    pub page: i64,
    pub limit: i64,
}

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        form: &LeadFormData,
        source: LeadSource,
        ip: &str,
    ) -> Result<Lead, AppError> {
        let consent_at: Option<DateTime<Utc>> = form.sms_consent.then(Utc::now);

        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                full_name, email, phone, company_name,
                project_type, project_timeline, project_details,
                existing_systems, referral_source, preferred_contact,
                sms_consent, sms_consent_at, sms_consent_ip, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&form.full_name)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.company_name)
        .bind(&form.project_type)
        .bind(&form.project_timeline)
        .bind(&form.project_details)
        .bind(&form.existing_systems)
        .bind(&form.referral_source)
        .bind(&form.preferred_contact)
        .bind(form.sms_consent)
        .bind(consent_at)
        .bind(ip)
        .bind(source)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    // Grava as duas saídas da análise e avança pending -> processed num único
    // UPDATE, para que nunca exista análise sem status `processed` (e vice-versa).
    pub async fn apply_analysis(
        &self,
        id: Uuid,
        score: LeadScore,
        internal: &serde_json::Value,
        prospect_summary: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE leads
            SET lead_score = $2,
                ai_internal_analysis = $3,
                ai_prospect_summary = $4,
                status = 'processed',
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(internal)
        .bind(prospect_summary)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    pub async fn set_status(&self, id: Uuid, status: LeadStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE leads SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // PATCH do admin: só escreve o que veio no corpo.
    pub async fn update_admin_fields(
        &self,
        id: Uuid,
        status: Option<LeadStatus>,
        notes: Option<&str>,
        score: Option<LeadScore>,
    ) -> Result<(), AppError> {
        if status.is_none() && notes.is_none() && score.is_none() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE leads SET updated_at = now()");
        if let Some(status) = status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(notes) = notes {
            qb.push(", notes = ").push_bind(notes.to_string());
        }
        if let Some(score) = score {
            qb.push(", lead_score = ").push_bind(score);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    pub async fn list(
        &self,
        filters: &LeadFilters,
    ) -> Result<(Vec<LeadListRow>, i64), AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, full_name, email, phone, company_name, source, status, \
             lead_score, project_type, created_at FROM leads",
        );
        Self::push_filters(&mut qb, filters);
        qb.push(" ORDER BY created_at DESC");

        let limit = filters.limit.max(1);
        let offset = (filters.page.max(1) - 1) * limit;
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb
            .build_query_as::<LeadListRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM leads");
        Self::push_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &LeadFilters) {
        qb.push(" WHERE TRUE");
        if let Some(search) = &filters.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(source) = filters.source {
            qb.push(" AND source = ").push_bind(source);
        }
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(score) = filters.score {
            qb.push(" AND lead_score = ").push_bind(score);
        }
    }

    // --- MÉTRICAS DO DASHBOARD ---

    pub async fn count_created_between(
        &self,
        from: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64, AppError> {
        let count: i64 = match until {
            Some(until) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM leads WHERE created_at >= $1 AND created_at < $2",
                )
                .bind(from)
                .bind(until)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM leads WHERE created_at >= $1")
                    .bind(from)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    pub async fn source_counts(&self) -> Result<Vec<(LeadSource, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (LeadSource, i64)>(
            "SELECT source, COUNT(*) FROM leads GROUP BY source",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Webhook de SMS: marca opt-out/opt-in por número de telefone.
    pub async fn set_sms_opt_out(&self, phone: &str, opted_out: bool) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE leads SET sms_opted_out = $2, updated_at = now() WHERE phone = $1",
        )
        .bind(phone)
        .bind(opted_out)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
