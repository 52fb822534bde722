// src/services/sms.rs
//
// SMS transacional via Twilio (API REST, form-encoded, basic auth).
// Sem as credenciais os envios viram logs (preview), igual ao mailer.

use crate::models::lead::Lead;
use crate::services::mailer::first_name;

#[derive(Clone)]
pub struct SmsSender {
    http: reqwest::Client,
    credentials: Option<TwilioCredentials>,
}

#[derive(Clone)]
struct TwilioCredentials {
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl SmsSender {
    pub fn new(
        http: reqwest::Client,
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Self {
        let credentials = match (account_sid, auth_token, from_number) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => {
                tracing::warn!("[SMS] Twilio não configurado — mensagens serão apenas logadas");
                None
            }
        };
        Self { http, credentials }
    }

    pub async fn send(&self, to: &str, message: &str) -> anyhow::Result<()> {
        let Some(creds) = &self.credentials else {
            tracing::info!("[SMS Preview] to: {to} | message: {message}");
            return Ok(());
        };

        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            creds.account_sid
        );
        self.http
            .post(url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&[("To", to), ("From", &creds.from_number), ("Body", message)])
            .send()
            .await?
            .error_for_status()?;

        tracing::info!("[SMS] enviado para: {to}");
        Ok(())
    }

    // Confirmação de recebimento do lead. Só sai com consentimento.
    pub async fn send_lead_confirmation(&self, lead: &Lead) -> anyhow::Result<()> {
        if !lead.sms_consent {
            tracing::info!("[SMS] sem consentimento — pulando SMS para {}", lead.full_name);
            return Ok(());
        }
        if lead.sms_opted_out {
            tracing::info!("[SMS] opt-out ativo — pulando SMS para {}", lead.full_name);
            return Ok(());
        }

        let message = format!(
            "Hi {first}! This is Botmakers.ai confirming we received your project inquiry. \
             We've sent a detailed summary to your email at {email}. \
             Our team is reviewing your project and will follow up within 24 hrs. \
             Questions? Reply here or call 866-753-8002. \
             Reply STOP to opt out.",
            first = first_name(&lead.full_name),
            email = lead.email,
        );
        self.send(&lead.phone, &message).await
    }

    pub async fn send_help_reply(&self, to: &str) -> anyhow::Result<()> {
        self.send(
            to,
            "Botmakers.ai support. Call 866-753-8002 or email info@botmakers.ai. \
             Reply STOP to opt out.",
        )
        .await
    }

    pub async fn send_acknowledgment(&self, to: &str) -> anyhow::Result<()> {
        self.send(
            to,
            "Thanks for the additional info! Our team is reviewing and will get back \
             to you shortly.",
        )
        .await
    }
}
