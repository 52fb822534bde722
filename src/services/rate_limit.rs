// src/services/rate_limit.rs
//
// Contador de submissões por IP via Upstash Redis (REST). A janela é o
// bucket da hora corrente: INCR na chave + EXPIRE de uma hora. Sem as
// credenciais do Upstash o limite fica desativado (fail-open), e uma falha
// de rede também libera a requisição — o formulário nunca quebra por causa
// do limitador.

use axum::http::HeaderMap;
use serde_json::{json, Value};

pub const LEAD_SUBMISSIONS_PER_HOUR: u32 = 3;
pub const REFERRAL_SUBMISSIONS_PER_HOUR: u32 = 5;

const WINDOW_SECONDS: i64 = 3600;

#[derive(Clone)]
pub struct RateLimiter {
    http: reqwest::Client,
    rest_url: Option<String>,
    rest_token: Option<String>,
}

impl RateLimiter {
    pub fn new(
        http: reqwest::Client,
        rest_url: Option<String>,
        rest_token: Option<String>,
    ) -> Self {
        if rest_url.is_none() || rest_token.is_none() {
            tracing::warn!("[Rate Limit] Upstash não configurado — limite de submissões desativado");
        }
        Self {
            http,
            rest_url,
            rest_token,
        }
    }

    // true = dentro do limite (requisição liberada).
    pub async fn check(&self, scope: &str, ip: &str, limit: u32) -> bool {
        let (Some(url), Some(token)) = (&self.rest_url, &self.rest_token) else {
            return true;
        };

        let bucket = chrono::Utc::now().timestamp() / WINDOW_SECONDS;
        let key = format!("botmakers:{scope}:{ip}:{bucket}");

        match self.incr(url, token, &key).await {
            Ok(count) => count <= limit as i64,
            Err(err) => {
                tracing::warn!("[Rate Limit] falha ao consultar o Upstash, liberando: {err:#}");
                true
            }
        }
    }

    async fn incr(&self, url: &str, token: &str, key: &str) -> anyhow::Result<i64> {
        // Pipeline: INCR + EXPIRE num único round-trip.
        let commands = json!([["INCR", key], ["EXPIRE", key, WINDOW_SECONDS]]);
        let response: Value = self
            .http
            .post(format!("{url}/pipeline"))
            .bearer_auth(token)
            .json(&commands)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response[0]["result"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("resposta inesperada do pipeline: {response}"))
    }
}

// Primeiro salto do x-forwarded-for, depois x-real-ip, senão "unknown".
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn ip_vem_do_primeiro_salto_do_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn ip_cai_para_x_real_ip_e_depois_para_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_ip(&headers), "198.51.100.7");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
