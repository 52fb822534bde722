// src/config.rs
//
// Estado compartilhado da aplicação. Tudo vem do ambiente (.env em dev);
// cada integração externa é opcional e degrada para log/heurística quando
// as credenciais faltam. Só o banco bloqueia de verdade: sem DATABASE_URL
// os endpoints que persistem respondem 503.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::common::error::AppError;
use crate::db::{LeadRepository, ProjectRepository, ReferralRepository};
use crate::services::{ai::AiEngine, mailer::Mailer, rate_limit::RateLimiter, sms::SmsSender};

const DEFAULT_SITE_URL: &str = "https://botmakers.ai";
const DEFAULT_APPROVE_SECRET: &str = "botmakers-dev-secret-change-in-production";
const DEFAULT_TEAM_EMAILS: &str = "jay@m.botmakers.ai,tdaniel@botmakers.ai,dessiah@m.botmakers.ai";
const DEFAULT_FROM_INFO: &str = "Botmakers.ai <info@botmakers.ai>";
const DEFAULT_FROM_LEADS: &str = "Botmakers Leads <leads@botmakers.ai>";

#[derive(Clone)]
pub struct Store {
    pub pool: PgPool,
    pub leads: LeadRepository,
    pub referrals: ReferralRepository,
    pub projects: ProjectRepository,
}

impl Store {
    fn new(pool: PgPool) -> Self {
        Self {
            leads: LeadRepository::new(pool.clone()),
            referrals: ReferralRepository::new(pool.clone()),
            projects: ProjectRepository::new(pool.clone()),
            pool,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Option<Store>,
    pub ai: AiEngine,
    pub mailer: Mailer,
    pub sms: SmsSender,
    pub rate_limiter: RateLimiter,
    pub approve_token_secret: String,
    pub site_url: String,
    pub admin_api_key: Option<String>,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppState {
    pub async fn from_env() -> anyhow::Result<Self> {
        let store = match env_opt("DATABASE_URL") {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(&url)
                    .await?;
                tracing::info!("✅ Conexão com o Postgres estabelecida");
                Some(Store::new(pool))
            }
            None => {
                tracing::warn!(
                    "DATABASE_URL ausente — endpoints que dependem do banco responderão 503"
                );
                None
            }
        };

        let http = reqwest::Client::new();

        let site_url = env_opt("SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        let approve_token_secret = env_opt("APPROVE_TOKEN_SECRET").unwrap_or_else(|| {
            tracing::warn!("APPROVE_TOKEN_SECRET ausente — usando o segredo de desenvolvimento");
            DEFAULT_APPROVE_SECRET.to_string()
        });
        let admin_api_key = env_opt("ADMIN_API_KEY");
        if admin_api_key.is_none() {
            tracing::warn!("ADMIN_API_KEY ausente — rotas /api/admin ficam SEM autenticação");
        }

        let team: Vec<String> = env_opt("TEAM_EMAILS")
            .unwrap_or_else(|| DEFAULT_TEAM_EMAILS.to_string())
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        let mailer = Mailer::new(
            http.clone(),
            env_opt("RESEND_API_KEY"),
            env_opt("RESEND_FROM_ADDRESS").unwrap_or_else(|| DEFAULT_FROM_INFO.to_string()),
            env_opt("RESEND_LEADS_FROM_ADDRESS").unwrap_or_else(|| DEFAULT_FROM_LEADS.to_string()),
            site_url.clone(),
            team,
        );

        let ai = AiEngine::new(http.clone(), env_opt("ANTHROPIC_API_KEY"));

        let sms = SmsSender::new(
            http.clone(),
            env_opt("TWILIO_ACCOUNT_SID"),
            env_opt("TWILIO_AUTH_TOKEN"),
            env_opt("TWILIO_PHONE_NUMBER"),
        );

        let rate_limiter = RateLimiter::new(
            http,
            env_opt("UPSTASH_REDIS_REST_URL"),
            env_opt("UPSTASH_REDIS_REST_TOKEN"),
        );

        Ok(Self {
            store,
            ai,
            mailer,
            sms,
            rate_limiter,
            approve_token_secret,
            site_url,
            admin_api_key,
        })
    }

    // Atalho das rotas que exigem banco.
    pub fn store(&self) -> Result<&Store, AppError> {
        self.store.as_ref().ok_or(AppError::ServiceUnavailable)
    }
}
