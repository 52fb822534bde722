// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

// --- ENUMS ---

// As opções fixas do formulário público. Qualquer outro valor é rejeitado.
pub const PROJECT_TYPES: [&str; 9] = [
    "Custom AI Software",
    "Systems Integration",
    "AI Strategy & Consulting",
    "Data Engineering",
    "ML Solutions",
    "AI Analytics & Insights",
    "Enterprise Security AI",
    "Process Automation",
    "Other",
];

pub const PROJECT_TIMELINES: [&str; 5] = [
    "ASAP / Urgent",
    "1–3 Months",
    "3–6 Months",
    "6+ Months",
    "Just Exploring / No Timeline",
];

// Mapeia o CREATE TYPE lead_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    Pending,
    Processed,
    Reviewed,
    Contacted,
    Qualified,
    Converted,
    Closed,
}

impl LeadStatus {
    // `converted` e `closed` são estados finais.
    pub fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Converted | LeadStatus::Closed)
    }

    // Transições permitidas pelo admin. `pending` e `processed` são estados
    // internos do pipeline de intake e `reviewed` só entra pelo link de
    // aprovação; nenhum dos três é destino de uma edição manual. Fora isso a
    // máquina é permissiva (qualquer estado -> contacted / qualified /
    // converted / closed).
    pub fn can_transition(self, to: LeadStatus) -> bool {
        if self == to {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        !matches!(
            to,
            LeadStatus::Pending | LeadStatus::Processed | LeadStatus::Reviewed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_score", rename_all = "lowercase")]
pub enum LeadScore {
    // A serialização segue a grafia do esquema da IA ("High"); os aliases
    // aceitam a forma minúscula usada nos filtros do admin.
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    WebForm,
    Referral,
    Vapi,
}

// --- ANÁLISE DA IA ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComplexityAssessment {
    pub level: ComplexityLevel,
    pub reasoning: String,
}

// Saída interna (para o time). Persiste em `leads.ai_internal_analysis` (JSONB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiInternalAnalysis {
    pub lead_score: LeadScore,
    pub project_summary: String,
    pub complexity_assessment: ComplexityAssessment,
    pub estimated_effort: String,
    pub key_questions: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    pub recommended_next_step: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendedPhase {
    pub phase: String,
    pub description: String,
}

// Saída voltada ao prospect. Persiste serializada como texto em
// `leads.ai_prospect_summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AiProspectOutput {
    pub project_understanding: String,
    pub recommended_path: Vec<RecommendedPhase>,
    pub what_happens_next: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AiAnalysisResult {
    pub internal: AiInternalAnalysis,
    pub prospect: AiProspectOutput,
}

// --- O LEAD (linha do banco) ---

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub project_type: String,
    pub project_timeline: String,
    pub project_details: String,
    pub existing_systems: Option<String>,
    pub referral_source: Option<String>,
    pub preferred_contact: Option<String>,
    pub sms_consent: bool,
    pub sms_consent_at: Option<DateTime<Utc>>,
    pub sms_consent_ip: Option<String>,
    pub sms_opted_out: bool,
    pub lead_score: LeadScore,
    // Guardado como JSONB; tipado só na borda (ver services/ai.rs)
    pub ai_internal_analysis: Option<Value>,
    pub ai_prospect_summary: Option<String>,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha enxuta para a listagem do admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LeadListRow {
    pub id: Uuid,
    #[serde(rename = "name")]
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "company")]
    pub company_name: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub lead_score: LeadScore,
    pub project_type: String,
    pub created_at: DateTime<Utc>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLeadPayload {
    #[validate(custom(function = "validate_required_text"))]
    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[validate(email(message = "Valid email is required"))]
    #[schema(example = "jane@acme.com")]
    pub email: String,

    #[validate(custom(function = "validate_us_phone"))]
    #[schema(example = "(555) 123-4567")]
    pub phone: String,

    #[serde(default)]
    pub company_name: Option<String>,

    #[validate(custom(function = "validate_project_type"))]
    pub project_type: String,

    #[validate(custom(function = "validate_project_timeline"))]
    pub project_timeline: String,

    #[validate(custom(function = "validate_project_details"))]
    pub project_details: String,

    #[serde(default)]
    pub sms_consent: bool,

    #[serde(default)]
    pub existing_systems: Option<String>,
    #[serde(default)]
    pub referral_source: Option<String>,
    #[serde(default)]
    pub preferred_contact: Option<String>,

    // Campo oculto anti-bot: se vier preenchido, a submissão vira no-op.
    #[serde(default)]
    pub honeypot: String,
}

// Payload já validado e normalizado (e-mail minúsculo, telefone E.164,
// detalhes sem espaços nas pontas). É o que o motor de IA e o banco recebem.
#[derive(Debug, Clone)]
pub struct LeadFormData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub project_type: String,
    pub project_timeline: String,
    pub project_details: String,
    pub sms_consent: bool,
    pub existing_systems: Option<String>,
    pub referral_source: Option<String>,
    pub preferred_contact: Option<String>,
}

impl SubmitLeadPayload {
    pub fn normalize(self) -> LeadFormData {
        LeadFormData {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: normalize_us_phone(&self.phone),
            company_name: none_if_blank(self.company_name),
            project_type: self.project_type,
            project_timeline: self.project_timeline,
            project_details: self.project_details.trim().to_string(),
            sms_consent: self.sms_consent,
            existing_systems: none_if_blank(self.existing_systems),
            referral_source: none_if_blank(self.referral_source),
            preferred_contact: none_if_blank(self.preferred_contact),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLeadPayload {
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
    pub lead_score: Option<LeadScore>,
}

// --- REGRAS DE VALIDAÇÃO ---

pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

// Normaliza para `+1` + 10 dígitos. Só é chamado depois da validação.
pub fn normalize_us_phone(raw: &str) -> String {
    format!("+1{}", phone_digits(raw))
}

fn validation_error(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("invalid");
    err.message = Some(message.into());
    err
}

pub fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("Full name is required"));
    }
    Ok(())
}

// Depois de remover tudo que não é dígito, precisa sobrar exatamente 10.
pub fn validate_us_phone(value: &str) -> Result<(), ValidationError> {
    if phone_digits(value).len() != 10 {
        return Err(validation_error("Valid phone number is required"));
    }
    Ok(())
}

pub fn validate_project_type(value: &str) -> Result<(), ValidationError> {
    if !PROJECT_TYPES.contains(&value) {
        return Err(validation_error("Project type is required"));
    }
    Ok(())
}

pub fn validate_project_timeline(value: &str) -> Result<(), ValidationError> {
    if !PROJECT_TIMELINES.contains(&value) {
        return Err(validation_error("Project timeline is required"));
    }
    Ok(())
}

// O corte de 50 caracteres é sobre o texto já sem espaços nas pontas.
pub fn validate_project_details(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < 50 {
        return Err(validation_error(
            "Project details must be at least 50 characters",
        ));
    }
    Ok(())
}

pub fn is_valid_email(value: &str) -> bool {
    value.validate_email()
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(details: &str) -> SubmitLeadPayload {
        SubmitLeadPayload {
            full_name: "Jane Doe".into(),
            email: "jane@acme.com".into(),
            phone: "(555) 123-4567".into(),
            company_name: Some("Acme".into()),
            project_type: "Process Automation".into(),
            project_timeline: "ASAP / Urgent".into(),
            project_details: details.into(),
            sms_consent: true,
            existing_systems: None,
            referral_source: None,
            preferred_contact: None,
            honeypot: String::new(),
        }
    }

    #[test]
    fn telefone_valido_normaliza_para_e164() {
        let form = payload(&"x".repeat(60)).normalize();
        assert_eq!(form.phone, "+15551234567");
    }

    #[test]
    fn telefone_precisa_de_exatamente_dez_digitos() {
        assert!(validate_us_phone("555-123-4567").is_ok());
        assert!(validate_us_phone("555-123-456").is_err());
        assert!(validate_us_phone("+1 555 123 4567").is_err());
        assert!(validate_us_phone("abc").is_err());
    }

    #[test]
    fn detalhes_com_49_caracteres_sao_rejeitados() {
        let p49 = payload(&format!("  {}  ", "a".repeat(49)));
        assert!(p49.validate().is_err());

        let p50 = payload(&format!("  {}  ", "a".repeat(50)));
        assert!(p50.validate().is_ok());
    }

    #[test]
    fn tipo_e_timeline_fora_da_lista_sao_rejeitados() {
        let mut p = payload(&"x".repeat(60));
        p.project_type = "Blockchain".into();
        assert!(p.validate().is_err());

        let mut p = payload(&"x".repeat(60));
        p.project_timeline = "someday".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn estados_finais_nao_transicionam() {
        assert!(!LeadStatus::Converted.can_transition(LeadStatus::Contacted));
        assert!(!LeadStatus::Closed.can_transition(LeadStatus::Qualified));
        assert!(LeadStatus::Processed.can_transition(LeadStatus::Contacted));
        assert!(LeadStatus::Pending.can_transition(LeadStatus::Closed));
        assert!(!LeadStatus::Processed.can_transition(LeadStatus::Pending));
    }

    #[test]
    fn estados_do_pipeline_nao_sao_destino_manual() {
        // `reviewed` só entra pelo link de aprovação, nunca por PATCH.
        assert!(!LeadStatus::Processed.can_transition(LeadStatus::Reviewed));
        assert!(!LeadStatus::Contacted.can_transition(LeadStatus::Pending));
        assert!(!LeadStatus::Contacted.can_transition(LeadStatus::Processed));
        // Sair de `reviewed` continua livre; reafirmar o mesmo estado é no-op.
        assert!(LeadStatus::Reviewed.can_transition(LeadStatus::Contacted));
        assert!(LeadStatus::Reviewed.can_transition(LeadStatus::Reviewed));
    }

    #[test]
    fn normalizacao_baixa_o_email_e_apara_opcionais() {
        let mut p = payload(&"x".repeat(60));
        p.email = "  Jane@Acme.COM ".into();
        p.company_name = Some("   ".into());
        let form = p.normalize();
        assert_eq!(form.email, "jane@acme.com");
        assert_eq!(form.company_name, None);
    }
}
