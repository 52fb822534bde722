// src/db/referral_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::referral::{group_referrals, Referral, ReferralSubmission, Referrer, ReferrerWithReferrals},
};

#[derive(Clone)]
pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Insere o indicador e seus 1..=5 indicados. Retorna o id do indicador,
    // que é o id que a resposta pública devolve.
    pub async fn insert_submission(
        &self,
        submission: &ReferralSubmission,
        ip: &str,
    ) -> Result<Uuid, AppError> {
        let referrer_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO referrers (full_name, email, company, feedback, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&submission.referrer_name)
        .bind(&submission.referrer_email)
        .bind(&submission.referrer_company)
        .bind(&submission.industry_feedback)
        .bind(ip)
        .fetch_one(&self.pool)
        .await?;

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO referrals (referrer_id, name, email, phone, company, status) ",
        );
        qb.push_values(&submission.referrals, |mut row, contact| {
            row.push_bind(referrer_id)
                .push_bind(&contact.name)
                .push_bind(&contact.email)
                .push_bind(&contact.phone)
                .push_bind(&contact.company)
                .push_bind("pending");
        });
        qb.build().execute(&self.pool).await?;

        Ok(referrer_id)
    }

    // Listagem do admin: indicadores mais recentes primeiro, cada um com os
    // seus indicados aninhados.
    pub async fn list_with_referrals(&self) -> Result<Vec<ReferrerWithReferrals>, AppError> {
        let referrers =
            sqlx::query_as::<_, Referrer>("SELECT * FROM referrers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        let referrals =
            sqlx::query_as::<_, Referral>("SELECT * FROM referrals ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(group_referrals(referrers, referrals))
    }
}
