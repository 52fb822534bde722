// src/services/ai.rs
//
// Motor de qualificação de leads. O caminho principal delega ao Claude
// (API de mensagens da Anthropic); sem chave configurada, ou diante de
// qualquer falha/resposta malformada, cai na heurística determinística.
// Este módulo nunca retorna erro ao chamador.

use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::lead::{
    AiAnalysisResult, AiInternalAnalysis, AiProspectOutput, ComplexityAssessment,
    ComplexityLevel, LeadFormData, LeadScore, RecommendedPhase,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-sonnet-4-5-20250929";

const SYSTEM_PROMPT: &str = r#"You are a project analyst for Botmakers.ai, an enterprise AI solutions company. Your role is to analyze inbound project inquiries and produce two outputs:

1. INTERNAL ANALYSIS (for the Botmakers team):
   - Lead Score: High / Medium / Low based on project type, timeline urgency, company presence, and detail quality
   - Project Summary: 2-3 sentence plain-English summary
   - Complexity Assessment: Simple / Moderate / Complex with reasoning
   - Estimated Effort: Rough range (e.g., "2-4 weeks", "1-2 months")
   - Key Questions: 2-5 questions for the discovery call
   - Red Flags: Any concerns (vague scope, unrealistic timeline, etc.) — empty array if none
   - Recommended Next Step: Suggested action

2. PROSPECT-FACING OUTPUT (for the client email):
   - Project Understanding: Summary reflecting back their needs
   - Recommended Path: 3-5 phases of how Botmakers would approach the project
   - What Happens Next: Clear explanation of the review and follow-up process

IMPORTANT GUARDRAILS:
- Never promise specific pricing, hard timelines, or guarantees
- Only suggest ranges and recommendations
- Be professional, confident, and warm — matching the Botmakers brand voice
- Keep the prospect output high-level; detailed breakdowns come after internal team review

Respond ONLY with valid JSON matching this exact structure:
{
  "internal": {
    "leadScore": "High" | "Medium" | "Low",
    "projectSummary": "string",
    "complexityAssessment": { "level": "Simple" | "Moderate" | "Complex", "reasoning": "string" },
    "estimatedEffort": "string",
    "keyQuestions": ["string"],
    "redFlags": ["string"],
    "recommendedNextStep": "string"
  },
  "prospect": {
    "projectUnderstanding": "string",
    "recommendedPath": [{ "phase": "string", "description": "string" }],
    "whatHappensNext": "string"
  }
}"#;

const POLISH_SYSTEM_PROMPT: &str = r#"You are a professional communication assistant for Botmakers.ai, a custom AI software development company. Your job is to polish team draft replies to client questions.

Guidelines:
- Make the reply professional, warm, and confident
- Maintain the team's original meaning and intent
- Keep it concise — don't add unnecessary filler
- Use a helpful, reassuring tone
- Don't overpromise timelines or features
- Don't add greetings or sign-offs (those are handled separately)
- Return ONLY the polished reply text, nothing else"#;

#[derive(Clone)]
pub struct AiEngine {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl AiEngine {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::warn!("[AI] ANTHROPIC_API_KEY ausente — análise usará a heurística local");
        }
        Self { http, api_key }
    }

    // Sempre retorna um resultado completo; toda falha é absorvida aqui.
    pub async fn analyze(&self, form: &LeadFormData) -> AiAnalysisResult {
        let Some(api_key) = &self.api_key else {
            return heuristic_analysis(form);
        };

        match self.request_analysis(api_key, form).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("[AI] falha na chamada ao Claude, usando heurística: {err:#}");
                heuristic_analysis(form)
            }
        }
    }

    async fn request_analysis(
        &self,
        api_key: &str,
        form: &LeadFormData,
    ) -> anyhow::Result<AiAnalysisResult> {
        let user_message = format!(
            "Analyze this project inquiry:\n\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Company: {}\n\
             Project Type: {}\n\
             Timeline: {}\n\
             Project Details: {}",
            form.full_name,
            form.email,
            form.phone,
            form.company_name.as_deref().unwrap_or("Not provided"),
            form.project_type,
            form.project_timeline,
            form.project_details,
        );

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": MODEL,
                "max_tokens": 2000,
                "temperature": 0.3,
                "system": SYSTEM_PROMPT,
                "messages": [{ "role": "user", "content": user_message }],
            }))
            .send()
            .await
            .context("requisição à API da Anthropic")?
            .error_for_status()
            .context("status de erro da API da Anthropic")?;

        let body: Value = response.json().await.context("corpo da resposta")?;
        let text = body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("resposta sem bloco de texto"))?;

        // A borda do LLM é entrada não confiável: o parse tipado é o guarda
        // de esquema. Qualquer campo faltando derruba para a heurística.
        let result: AiAnalysisResult = serde_json::from_str(strip_code_fences(text))
            .context("JSON da análise fora do esquema esperado")?;
        Ok(result)
    }

    // Lapida o rascunho de resposta do time a uma pergunta do cliente. Sem
    // chave configurada o rascunho volta intacto; uma falha na chamada sobe
    // ao chamador (o admin vê o erro e pode reenviar).
    pub async fn polish_reply(
        &self,
        question_text: &str,
        draft_reply: &str,
        project_id: Option<Uuid>,
    ) -> anyhow::Result<String> {
        let Some(api_key) = &self.api_key else {
            tracing::info!("[AI] sem chave — devolvendo o rascunho sem lapidação");
            return Ok(draft_reply.to_string());
        };

        let project_line = project_id
            .map(|id| format!("Project ID: {id}"))
            .unwrap_or_default();
        let user_message = format!(
            "Client question: \"{question_text}\"\n\n\
             Team's draft reply: \"{draft_reply}\"\n\n\
             {project_line}\n\n\
             Please polish this reply to be professional and clear while keeping the same meaning."
        );

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": MODEL,
                "max_tokens": 1000,
                "temperature": 0.5,
                "system": POLISH_SYSTEM_PROMPT,
                "messages": [{ "role": "user", "content": user_message }],
            }))
            .send()
            .await
            .context("requisição à API da Anthropic")?
            .error_for_status()
            .context("status de erro da API da Anthropic")?;

        let body: Value = response.json().await.context("corpo da resposta")?;
        // Resposta sem bloco de texto: o rascunho segue valendo.
        let polished = body["content"][0]["text"].as_str().unwrap_or(draft_reply);
        Ok(polished.trim().to_string())
    }
}

// Remove o embrulho ```json ... ``` que o modelo às vezes adiciona.
fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```") {
        t = match rest.split_once('\n') {
            Some((_, body)) => body,
            None => rest,
        };
    }
    t = t.trim_end();
    if let Some(body) = t.strip_suffix("```") {
        t = body;
    }
    t.trim()
}

fn is_urgent_timeline(timeline: &str) -> bool {
    timeline == "ASAP / Urgent" || timeline == "1–3 Months"
}

// Heurística determinística: a mesma tripla (timeline, empresa, tamanho dos
// detalhes) produz sempre o mesmo score.
pub fn heuristic_analysis(form: &LeadFormData) -> AiAnalysisResult {
    let urgent = is_urgent_timeline(&form.project_timeline);
    let has_company = form.company_name.is_some();
    let detail_length = form.project_details.chars().count();

    let score = if urgent && has_company && detail_length > 150 {
        LeadScore::High
    } else if !urgent && detail_length < 100 {
        LeadScore::Low
    } else {
        LeadScore::Medium
    };

    let company_suffix = form
        .company_name
        .as_deref()
        .map(|c| format!(" from {c}"))
        .unwrap_or_default();

    AiAnalysisResult {
        internal: AiInternalAnalysis {
            lead_score: score,
            project_summary: format!(
                "{}{} is looking for {} with a {} timeline.",
                form.full_name,
                company_suffix,
                form.project_type,
                form.project_timeline.to_lowercase(),
            ),
            complexity_assessment: ComplexityAssessment {
                level: ComplexityLevel::Moderate,
                reasoning: "Based on the project type and description, this appears to be a \
                            standard enterprise engagement requiring discovery and scoping."
                    .to_string(),
            },
            estimated_effort: "4-8 weeks".to_string(),
            key_questions: vec![
                "What are the primary KPIs you want to improve with this solution?".to_string(),
                "What does your current tech stack look like?".to_string(),
                "Who are the key stakeholders and decision-makers?".to_string(),
                "Do you have existing data pipelines we can leverage?".to_string(),
            ],
            red_flags: vec![],
            recommended_next_step:
                "Schedule a 30-minute discovery call to discuss project scope and requirements."
                    .to_string(),
        },
        prospect: AiProspectOutput {
            project_understanding: format!(
                "We understand you're looking for {} solutions to help transform your business \
                 operations. Based on your description, this aligns well with the enterprise AI \
                 solutions we build at Botmakers.",
                form.project_type.to_lowercase(),
            ),
            recommended_path: vec![
                RecommendedPhase {
                    phase: "Discovery & Assessment".to_string(),
                    description: "We'll schedule a call to understand your business needs, \
                                  existing systems, and success criteria in detail."
                        .to_string(),
                },
                RecommendedPhase {
                    phase: "Solution Architecture".to_string(),
                    description: "Our team will design a tailored solution blueprint addressing \
                                  your specific requirements and technical constraints."
                        .to_string(),
                },
                RecommendedPhase {
                    phase: "Development & Integration".to_string(),
                    description: "We build and integrate the solution with your existing \
                                  workflows, with regular check-ins and progress updates."
                        .to_string(),
                },
                RecommendedPhase {
                    phase: "Testing & Deployment".to_string(),
                    description: "Rigorous QA testing followed by a phased deployment to ensure \
                                  zero disruption to your operations."
                        .to_string(),
                },
                RecommendedPhase {
                    phase: "Ongoing Support".to_string(),
                    description: "Post-launch monitoring, optimization, and support to ensure \
                                  long-term success."
                        .to_string(),
                },
            ],
            what_happens_next:
                "Our team is reviewing your project details right now. You'll receive a follow-up \
                 from one of our specialists within 24 business hours. In the meantime, feel free \
                 to book a call directly if you'd like to fast-track the conversation."
                    .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(timeline: &str, company: Option<&str>, detail_len: usize) -> LeadFormData {
        LeadFormData {
            full_name: "Jane Doe".into(),
            email: "jane@acme.com".into(),
            phone: "+15551234567".into(),
            company_name: company.map(Into::into),
            project_type: "Process Automation".into(),
            project_timeline: timeline.into(),
            project_details: "d".repeat(detail_len),
            sms_consent: false,
            existing_systems: None,
            referral_source: None,
            preferred_contact: None,
        }
    }

    #[test]
    fn heuristica_pontua_pela_tripla_timeline_empresa_detalhes() {
        let high = heuristic_analysis(&form("ASAP / Urgent", Some("Acme"), 200));
        assert_eq!(high.internal.lead_score, LeadScore::High);

        // urgente mas sem empresa: não é High
        let medium = heuristic_analysis(&form("1–3 Months", None, 200));
        assert_eq!(medium.internal.lead_score, LeadScore::Medium);

        // sem urgência e com poucos detalhes: Low
        let low = heuristic_analysis(&form("6+ Months", Some("Acme"), 80));
        assert_eq!(low.internal.lead_score, LeadScore::Low);

        // sem urgência mas detalhado: Medium
        let medium = heuristic_analysis(&form("6+ Months", Some("Acme"), 120));
        assert_eq!(medium.internal.lead_score, LeadScore::Medium);
    }

    #[test]
    fn heuristica_e_deterministica() {
        let a = heuristic_analysis(&form("ASAP / Urgent", Some("Acme"), 151));
        let b = heuristic_analysis(&form("ASAP / Urgent", Some("Acme"), 151));
        assert_eq!(a, b);
    }

    #[test]
    fn heuristica_sempre_preenche_o_esquema_inteiro() {
        let result = heuristic_analysis(&form("Just Exploring / No Timeline", None, 60));
        assert!(!result.internal.project_summary.is_empty());
        assert!(!result.internal.estimated_effort.is_empty());
        assert!(!result.internal.key_questions.is_empty());
        assert!(!result.internal.recommended_next_step.is_empty());
        assert!(!result.prospect.project_understanding.is_empty());
        assert!(result.prospect.recommended_path.len() >= 3);
        assert!(!result.prospect.what_happens_next.is_empty());
        assert_eq!(
            result.internal.complexity_assessment.level,
            ComplexityLevel::Moderate
        );
    }

    #[test]
    fn remove_cercas_de_codigo_markdown() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn polish_sem_chave_devolve_o_rascunho_intacto() {
        let engine = AiEngine::new(reqwest::Client::new(), None);
        let polished = engine
            .polish_reply("When do we launch?", "We are on track for next month.", None)
            .await
            .unwrap();
        assert_eq!(polished, "We are on track for next month.");
    }

    #[test]
    fn saida_do_llm_fora_do_esquema_nao_passa_no_parse() {
        let missing_fields = r#"{"internal": {"leadScore": "High"}, "prospect": {}}"#;
        assert!(serde_json::from_str::<AiAnalysisResult>(missing_fields).is_err());
    }

    #[test]
    fn analise_serializa_em_camel_case() {
        let result = heuristic_analysis(&form("ASAP / Urgent", Some("Acme"), 200));
        let value = serde_json::to_value(&result.internal).unwrap();
        assert_eq!(value["leadScore"], "High");
        assert!(value["complexityAssessment"]["reasoning"].is_string());
        assert!(value["redFlags"].as_array().unwrap().is_empty());
    }
}
