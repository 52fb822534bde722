// src/models/referral.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::lead::{is_valid_email, normalize_us_phone, phone_digits};

pub const MAX_REFERRAL_SLOTS: usize = 5;

// --- LINHAS DO BANCO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Referrer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub company: Option<String>,
    pub feedback: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Referral {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

// --- VIEWS (listagem do admin) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferralEntry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub status: String,
}

// Indicador com os indicados aninhados e o total, como o dashboard exibe.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReferrerWithReferrals {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub company: Option<String>,
    pub feedback: Option<String>,
    pub total_referrals: usize,
    pub created_at: DateTime<Utc>,
    pub referrals: Vec<ReferralEntry>,
}

// Agrupa os indicados sob cada indicador, preservando a ordem em que os
// indicadores chegam (mais recentes primeiro, como o repositório devolve).
pub fn group_referrals(
    referrers: Vec<Referrer>,
    referrals: Vec<Referral>,
) -> Vec<ReferrerWithReferrals> {
    referrers
        .into_iter()
        .map(|referrer| {
            let own: Vec<ReferralEntry> = referrals
                .iter()
                .filter(|r| r.referrer_id == referrer.id)
                .map(|r| ReferralEntry {
                    name: r.name.clone(),
                    email: r.email.clone(),
                    phone: r.phone.clone(),
                    company: r.company.clone(),
                    status: r.status.clone(),
                })
                .collect();
            ReferrerWithReferrals {
                id: referrer.id,
                full_name: referrer.full_name,
                email: referrer.email,
                company: referrer.company,
                feedback: referrer.feedback,
                total_referrals: own.len(),
                created_at: referrer.created_at,
                referrals: own,
            }
        })
        .collect()
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReferralSlotPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
}

impl ReferralSlotPayload {
    // Um slot "tocado" é aquele em que o usuário começou a digitar:
    // qualquer um dos três campos obrigatórios não vazio.
    pub fn is_touched(&self) -> bool {
        !self.name.trim().is_empty()
            || !self.email.trim().is_empty()
            || !self.phone.trim().is_empty()
    }

    // Valida um slot tocado. Retorna a primeira mensagem de erro, já com o
    // número do slot (1-based) como o formulário exibe.
    pub fn first_error(&self, slot_number: usize) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some(format!("Referral {slot_number}: name is required"));
        }
        if !is_valid_email(self.email.trim()) {
            return Some(format!("Referral {slot_number}: a valid email is required"));
        }
        if phone_digits(&self.phone).len() != 10 {
            return Some(format!(
                "Referral {slot_number}: a valid phone number is required"
            ));
        }
        None
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReferralPayload {
    #[serde(default)]
    pub referrer_name: String,
    #[serde(default)]
    pub referrer_email: String,
    #[serde(default)]
    pub referrer_company: String,
    #[serde(default)]
    pub industry_feedback: String,
    #[serde(default)]
    pub referrals: Vec<ReferralSlotPayload>,
    #[serde(default)]
    pub honeypot: String,
}

// Submissão validada e normalizada, pronta para persistir e notificar.
#[derive(Debug, Clone)]
pub struct ReferralSubmission {
    pub referrer_name: String,
    pub referrer_email: String,
    pub referrer_company: Option<String>,
    pub industry_feedback: Option<String>,
    pub referrals: Vec<ReferralContact>,
}

#[derive(Debug, Clone)]
pub struct ReferralContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
}

impl SubmitReferralPayload {
    // Aplica as regras do formulário de indicação: nome e e-mail do
    // indicador, 1..=5 slots tocados e cada slot tocado completo.
    pub fn validate_and_normalize(&self) -> Result<ReferralSubmission, String> {
        if self.referrer_name.trim().is_empty() {
            return Err("Your name is required".to_string());
        }
        if !is_valid_email(self.referrer_email.trim()) {
            return Err("A valid email is required".to_string());
        }

        let touched: Vec<(usize, &ReferralSlotPayload)> = self
            .referrals
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_touched())
            .collect();

        if touched.is_empty() {
            return Err("At least one referral is required".to_string());
        }
        if touched.len() > MAX_REFERRAL_SLOTS {
            return Err(format!(
                "At most {MAX_REFERRAL_SLOTS} referrals are allowed"
            ));
        }

        let mut contacts = Vec::with_capacity(touched.len());
        for (idx, slot) in touched {
            if let Some(message) = slot.first_error(idx + 1) {
                return Err(message);
            }
            contacts.push(ReferralContact {
                name: slot.name.trim().to_string(),
                email: slot.email.trim().to_lowercase(),
                phone: normalize_us_phone(&slot.phone),
                company: blank_to_none(&slot.company),
            });
        }

        Ok(ReferralSubmission {
            referrer_name: self.referrer_name.trim().to_string(),
            referrer_email: self.referrer_email.trim().to_lowercase(),
            referrer_company: blank_to_none(&self.referrer_company),
            industry_feedback: blank_to_none(&self.industry_feedback),
            referrals: contacts,
        })
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str, email: &str, phone: &str) -> ReferralSlotPayload {
        ReferralSlotPayload {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            company: String::new(),
        }
    }

    fn payload(slots: Vec<ReferralSlotPayload>) -> SubmitReferralPayload {
        SubmitReferralPayload {
            referrer_name: "Jane Doe".into(),
            referrer_email: "jane@x.com".into(),
            referrer_company: String::new(),
            industry_feedback: String::new(),
            referrals: slots,
            honeypot: String::new(),
        }
    }

    #[test]
    fn slot_vazio_nao_conta_como_tocado() {
        let p = payload(vec![
            slot("Bob Smith", "bob@y.com", "5551234567"),
            ReferralSlotPayload::default(),
        ]);
        let submission = p.validate_and_normalize().unwrap();
        assert_eq!(submission.referrals.len(), 1);
        assert_eq!(submission.referrals[0].phone, "+15551234567");
    }

    #[test]
    fn slot_tocado_incompleto_reporta_o_numero_do_slot() {
        let p = payload(vec![
            slot("Bob Smith", "bob@y.com", "5551234567"),
            slot("Ann Lee", "not-an-email", "5559876543"),
        ]);
        let err = p.validate_and_normalize().unwrap_err();
        assert_eq!(err, "Referral 2: a valid email is required");
    }

    #[test]
    fn precisa_de_pelo_menos_um_slot() {
        let p = payload(vec![ReferralSlotPayload::default()]);
        assert_eq!(
            p.validate_and_normalize().unwrap_err(),
            "At least one referral is required"
        );
    }

    #[test]
    fn telefone_do_slot_exige_dez_digitos() {
        let p = payload(vec![slot("Bob Smith", "bob@y.com", "555123")]);
        assert_eq!(
            p.validate_and_normalize().unwrap_err(),
            "Referral 1: a valid phone number is required"
        );
    }

    fn referrer(id: Uuid, name: &str) -> Referrer {
        Referrer {
            id,
            full_name: name.into(),
            email: format!("{}@x.com", name.to_lowercase().replace(' ', ".")),
            company: None,
            feedback: None,
            ip_address: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn referral(referrer_id: Uuid, name: &str) -> Referral {
        Referral {
            id: Uuid::new_v4(),
            referrer_id,
            name: name.into(),
            email: "bob@y.com".into(),
            phone: "+15551234567".into(),
            company: None,
            status: "pending".into(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn agrupamento_aninha_os_indicados_do_indicador_certo() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let grouped = group_referrals(
            vec![referrer(a, "Jane Doe"), referrer(b, "John Roe")],
            vec![
                referral(a, "Bob Smith"),
                referral(b, "Ann Lee"),
                referral(a, "Cid Vox"),
            ],
        );

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].total_referrals, 2);
        assert_eq!(grouped[0].referrals[0].name, "Bob Smith");
        assert_eq!(grouped[0].referrals[1].name, "Cid Vox");
        assert_eq!(grouped[1].total_referrals, 1);
        assert_eq!(grouped[1].referrals[0].name, "Ann Lee");
    }

    #[test]
    fn indicador_sem_indicados_aparece_com_total_zero() {
        let grouped = group_referrals(vec![referrer(Uuid::new_v4(), "Jane Doe")], vec![]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].total_referrals, 0);
        assert!(grouped[0].referrals.is_empty());
    }
}
