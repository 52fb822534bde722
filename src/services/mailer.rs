// src/services/mailer.rs
//
// E-mails transacionais via Resend. Sem RESEND_API_KEY os envios viram
// logs (preview), e o resto do sistema segue funcionando normalmente.

use serde_json::json;

use crate::models::{
    lead::{AiInternalAnalysis, AiProspectOutput, Lead},
    project::{Project, ProjectDemo, ProjectQuestion},
    referral::{ReferralContact, ReferralSubmission},
};

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const CAL_LINK: &str = "https://cal.com/botmakers/30min";

pub(crate) fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or(full_name)
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_key: Option<String>,
    pub from_info: String,
    pub from_leads: String,
    pub site_url: String,
    pub team: Vec<String>,
}

impl Mailer {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        from_info: String,
        from_leads: String,
        site_url: String,
        team: Vec<String>,
    ) -> Self {
        if api_key.is_none() {
            tracing::warn!("[Email] RESEND_API_KEY ausente — e-mails serão apenas logados");
        }
        Self {
            http,
            api_key,
            from_info,
            from_leads,
            site_url,
            team,
        }
    }

    async fn send(
        &self,
        from: &str,
        to: &[String],
        subject: &str,
        html: String,
        reply_to: Option<&str>,
    ) -> anyhow::Result<()> {
        let Some(api_key) = &self.api_key else {
            tracing::info!(
                "[Email Preview] to: {} | subject: {}",
                to.join(", "),
                subject
            );
            return Ok(());
        };

        let mut body = json!({
            "from": from,
            "to": to,
            "subject": subject,
            "html": html,
        });
        if let Some(reply_to) = reply_to {
            body["reply_to"] = json!(reply_to);
        }

        self.http
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        tracing::info!("[Email] enviado para: {} ({})", to.join(", "), subject);
        Ok(())
    }

    // Moldura comum: cabeçalho com o logo e rodapé institucional.
    fn wrap(&self, content: &str) -> String {
        format!(
            r#"<div style="font-family: 'Inter Tight', Arial, sans-serif; max-width: 600px; margin: 0 auto; background: #ffffff;">
  <div style="background: #033457; padding: 32px; text-align: center;">
    <img src="{site}/assets/botmakers-white-green-logo.png" alt="Botmakers.ai" style="height: 32px;" />
  </div>
  <div style="padding: 32px;">{content}</div>
  <div style="background: #033457; padding: 20px 32px; text-align: center;">
    <p style="color: #ffffff80; font-size: 12px; margin: 0;">
      Botmakers.ai &mdash; A Division of BioQuest, Inc.<br />
      24285 Katy Freeway, Suite 300, Katy, TX 77494<br />
      866-753-8002 | info@botmakers.ai
    </p>
  </div>
</div>"#,
            site = self.site_url,
        )
    }

    fn button(text: &str, href: &str) -> String {
        format!(
            r#"<div style="text-align: center; margin: 32px 0;">
  <a href="{href}" style="display: inline-block; background: #03FF00; color: #033457; padding: 14px 32px; border-radius: 8px; text-decoration: none; font-weight: 700;">{text}</a>
</div>"#
        )
    }

    // =========================================================================
    //  PIPELINE DE LEADS
    // =========================================================================

    // E-mail interno de revisão: análise completa + link de aprovação.
    pub async fn send_internal_review(
        &self,
        lead: &Lead,
        analysis: &AiInternalAnalysis,
        approve_token: &str,
    ) -> anyhow::Result<()> {
        let subject = format!(
            "[New Lead] {} — {} ({:?})",
            lead.company_name.as_deref().unwrap_or(&lead.full_name),
            lead.project_type,
            analysis.lead_score,
        );
        let approve_url = format!(
            "{}/api/leads/{}/approve?token={}",
            self.site_url, lead.id, approve_token
        );

        let questions = analysis
            .key_questions
            .iter()
            .map(|q| format!("<li style=\"margin-bottom: 4px;\">{q}</li>"))
            .collect::<String>();
        let red_flags = if analysis.red_flags.is_empty() {
            String::new()
        } else {
            format!(
                "<p style=\"font-weight: 600; color: #FF4444; margin: 16px 0 8px;\">Red Flags:</p><ul>{}</ul>",
                analysis
                    .red_flags
                    .iter()
                    .map(|f| format!("<li style=\"margin-bottom: 4px;\">{f}</li>"))
                    .collect::<String>()
            )
        };

        let content = format!(
            r#"<h1 style="color: #033457; font-size: 20px;">New Lead Submission — {score:?} Priority</h1>
<h2 style="color: #033457; font-size: 16px;">Contact Information</h2>
<p><strong>{name}</strong>{company}<br />
<a href="mailto:{email}">{email}</a> | <a href="tel:{phone}">{phone}</a></p>
<h2 style="color: #033457; font-size: 16px;">Project Details</h2>
<p>Type: {ptype}<br />Timeline: {timeline}<br />SMS Consent: {consent}</p>
<div style="background: #f5f5f5; padding: 16px; border-radius: 8px;">
  <p style="margin: 0; white-space: pre-wrap;">{details}</p>
</div>
<h2 style="color: #033457; font-size: 16px;">AI Analysis</h2>
<div style="background: #f0f7ff; padding: 16px; border-radius: 8px; border-left: 4px solid #033457;">
  <p style="margin: 0;">{summary}</p>
</div>
<p>Complexity: <strong>{complexity:?}</strong> | Est. Effort: <strong>{effort}</strong></p>
<p style="font-weight: 600; color: #033457;">Key Questions for Discovery Call:</p>
<ul>{questions}</ul>
{red_flags}
<div style="background: #03FF00; padding: 12px 16px; border-radius: 8px; margin: 24px 0;">
  <p style="margin: 0; font-weight: 600; color: #033457;">Recommended Next Step: {next_step}</p>
</div>
{button}
<p style="color: #999; font-size: 12px; text-align: center;">Click to send the prospect a detailed project breakdown</p>"#,
            score = analysis.lead_score,
            name = lead.full_name,
            company = lead
                .company_name
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default(),
            email = lead.email,
            phone = lead.phone,
            ptype = lead.project_type,
            timeline = lead.project_timeline,
            consent = if lead.sms_consent { "Yes" } else { "No" },
            details = lead.project_details,
            summary = analysis.project_summary,
            complexity = analysis.complexity_assessment.level,
            effort = analysis.estimated_effort,
            questions = questions,
            red_flags = red_flags,
            next_step = analysis.recommended_next_step,
            button = Self::button("Send Detailed Follow-Up Email", &approve_url),
        );

        let html = self.wrap(&content);
        self.send(&self.from_leads, &self.team, &subject, html, None)
            .await
    }

    // Resumo para o prospect: plano em fases + link de agendamento.
    pub async fn send_prospect_summary(
        &self,
        lead: &Lead,
        prospect: &AiProspectOutput,
    ) -> anyhow::Result<()> {
        let first = first_name(&lead.full_name);
        let subject = format!("{first}, here is your project summary from Botmakers.ai");

        let path = prospect
            .recommended_path
            .iter()
            .enumerate()
            .map(|(i, step)| {
                format!(
                    r#"<p style="margin: 12px 0 0;"><strong>{}. {}</strong><br />
<span style="color: #666; font-size: 14px;">{}</span></p>"#,
                    i + 1,
                    step.phase,
                    step.description
                )
            })
            .collect::<String>();

        let content = format!(
            r#"<p>Hi {first},</p>
<p>Thank you for reaching out to Botmakers.ai! We've reviewed your project inquiry and put together an initial summary for you.</p>
<div style="background: #f0f7ff; padding: 20px; border-radius: 8px; border-left: 4px solid #033457; margin: 24px 0;">
  <h3 style="color: #033457; margin: 0 0 8px; font-size: 16px;">Our Understanding of Your Project</h3>
  <p style="margin: 0;">{understanding}</p>
</div>
<h3 style="color: #033457; font-size: 16px;">Recommended Project Path</h3>
{path}
<div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 24px 0;">
  <h3 style="color: #033457; margin: 0 0 8px; font-size: 16px;">What Happens Next</h3>
  <p style="margin: 0;">{next}</p>
</div>
{button}
<p style="color: #666; font-size: 14px;">Have questions? Simply reply to this email and our team will get back to you promptly.</p>
<p>Best regards,<br /><strong>The Botmakers.ai Team</strong></p>"#,
            first = first,
            understanding = prospect.project_understanding,
            path = path,
            next = prospect.what_happens_next,
            button = Self::button("Book a Call With Our Team", CAL_LINK),
        );

        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&lead.email),
            &subject,
            html,
            Some("info@botmakers.ai"),
        )
        .await
    }

    // =========================================================================
    //  PIPELINE DE INDICAÇÕES
    // =========================================================================

    // Warm intro: apresentação ao contato indicado, em nome do indicador.
    pub async fn send_referral_warm_intro(
        &self,
        submission: &ReferralSubmission,
        contact: &ReferralContact,
    ) -> anyhow::Result<()> {
        let subject = format!(
            "{} thought you might be interested in this",
            first_name(&submission.referrer_name)
        );
        let referrer_company = submission
            .referrer_company
            .as_deref()
            .map(|c| format!(" from {c}"))
            .unwrap_or_default();

        let content = format!(
            r#"<p>Hi {first},</p>
<p>Your colleague <strong>{referrer}</strong>{referrer_company} thought you might be interested in what we're building at Botmakers.ai.</p>
<p>We build custom AI-powered software and systems for businesses &mdash; from intelligent automation to predictive analytics. We deliver MVPs within one week so you can see results fast.</p>
{button}
<p>Or if you'd prefer, <a href="{site}/#project-form" style="color: #033457; font-weight: 600;">fill out a quick project brief</a> and we'll send you a personalized summary.</p>
<p style="color: #999; font-size: 14px;">If this isn't relevant, no worries at all &mdash; we won't follow up further unless you reach out.</p>"#,
            first = first_name(&contact.name),
            referrer = submission.referrer_name,
            referrer_company = referrer_company,
            button = Self::button("Book a Free Consultation", CAL_LINK),
            site = self.site_url,
        );

        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&contact.email),
            &subject,
            html,
            Some("info@botmakers.ai"),
        )
        .await
    }

    // Resumo de todas as indicações para o time.
    pub async fn send_referral_team_summary(
        &self,
        submission: &ReferralSubmission,
    ) -> anyhow::Result<()> {
        let subject = format!(
            "[Referrals] {} sent {} referral(s)",
            submission.referrer_name,
            submission.referrals.len()
        );

        let rows = submission
            .referrals
            .iter()
            .map(|r| {
                format!(
                    "<li style=\"margin-bottom: 8px;\"><strong>{}</strong> &mdash; {} | {}{}</li>",
                    r.name,
                    r.email,
                    r.phone,
                    r.company
                        .as_deref()
                        .map(|c| format!(" ({c})"))
                        .unwrap_or_default(),
                )
            })
            .collect::<String>();
        let feedback = submission
            .industry_feedback
            .as_deref()
            .map(|f| {
                format!(
                    r#"<h3 style="color: #033457; font-size: 16px;">Industry Feedback</h3>
<div style="background: #f5f5f5; padding: 16px; border-radius: 8px;"><p style="margin: 0;">{f}</p></div>"#
                )
            })
            .unwrap_or_default();

        let content = format!(
            r#"<h2 style="color: #033457; font-size: 18px;">New Referral Submission</h2>
<p><strong>{referrer}</strong>{company} &mdash; {email}</p>
<h3 style="color: #033457; font-size: 16px;">Referred Contacts</h3>
<ul>{rows}</ul>
{feedback}"#,
            referrer = submission.referrer_name,
            company = submission
                .referrer_company
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default(),
            email = submission.referrer_email,
            rows = rows,
            feedback = feedback,
        );

        let html = self.wrap(&content);
        self.send(&self.from_leads, &self.team, &subject, html, None)
            .await
    }

    pub async fn send_referrer_thank_you(
        &self,
        submission: &ReferralSubmission,
    ) -> anyhow::Result<()> {
        let first = first_name(&submission.referrer_name);
        let subject = format!("{first}, thank you for the introductions!");

        let content = format!(
            r#"<p>Hi {first},</p>
<p>Thank you for introducing us to {count} of your contacts &mdash; it means a lot. We've sent each of them a short, no-pressure note mentioning you.</p>
<p>If any of them kicks off a project with us, we'll make sure you hear about it first.</p>
{button}
<p>Best,<br /><strong>The Botmakers Team</strong></p>"#,
            first = first,
            count = submission.referrals.len(),
            button = Self::button("Book a Call With Our Team", CAL_LINK),
        );

        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&submission.referrer_email),
            &subject,
            html,
            Some("info@botmakers.ai"),
        )
        .await
    }

    // =========================================================================
    //  NOTIFICAÇÕES DO PORTAL / PROJETOS
    // =========================================================================

    pub async fn send_milestone_completed(
        &self,
        project: &Project,
        milestone_title: &str,
        progress: u8,
    ) -> anyhow::Result<()> {
        let first = first_name(&project.client_name);
        let portal_url = format!("{}/portal/projects/{}", self.site_url, project.id);

        let content = format!(
            r#"<p>Hi {first},</p>
<p>Great news! A milestone on your project <strong>{name}</strong> has been completed:</p>
<div style="background: #f0fdf0; padding: 16px 20px; border-radius: 8px; border-left: 4px solid #03FF00; margin: 24px 0;">
  <p style="margin: 0; font-weight: 600;">&check; {milestone}</p>
</div>
<p>Your project is now <strong>{progress}% complete</strong>. Visit your portal to see the full progress.</p>
{button}
<p style="color: #666; font-size: 14px;">Questions? Reply to this email or submit a question through your portal.</p>
<p>Best,<br /><strong>The Botmakers Team</strong></p>"#,
            first = first,
            name = project.name,
            milestone = milestone_title,
            progress = progress,
            button = Self::button("View Project Progress", &portal_url),
        );

        let subject = format!("Project Update: {milestone_title} is complete!");
        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&project.client_email),
            &subject,
            html,
            None,
        )
        .await
    }

    pub async fn send_demo_shared(
        &self,
        project: &Project,
        demo: &ProjectDemo,
    ) -> anyhow::Result<()> {
        let first = first_name(&project.client_name);
        let portal_url = format!("{}/portal/projects/{}", self.site_url, project.id);
        let description = demo
            .description
            .as_deref()
            .map(|d| format!("<p style=\"color: #666; font-size: 14px; margin: 0 0 12px;\">{d}</p>"))
            .unwrap_or_default();

        let content = format!(
            r#"<p>Hi {first},</p>
<p>We have a new demo ready for your project <strong>{name}</strong>:</p>
<div style="background: #f0f7ff; padding: 20px; border-radius: 8px; border-left: 4px solid #033457; margin: 24px 0;">
  <p style="color: #033457; font-weight: 600; margin: 0 0 8px;">{title}</p>
  {description}
  <a href="{url}" style="display: inline-block; background: #033457; color: #ffffff; padding: 10px 24px; border-radius: 6px; text-decoration: none; font-weight: 600;">View Demo &rarr;</a>
</div>
<p>We'd love your feedback! You can view all demos and submit questions through your portal.</p>
{button}
<p>Best,<br /><strong>The Botmakers Team</strong></p>"#,
            first = first,
            name = project.name,
            title = demo.title,
            description = description,
            url = demo.url,
            button = Self::button("Open Portal", &portal_url),
        );

        let subject = format!("New demo for {}", project.name);
        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&project.client_email),
            &subject,
            html,
            None,
        )
        .await
    }

    pub async fn send_question_replied(
        &self,
        project: &Project,
        question: &ProjectQuestion,
    ) -> anyhow::Result<()> {
        let first = first_name(&project.client_name);
        let portal_url = format!("{}/portal/projects/{}", self.site_url, project.id);

        let content = format!(
            r#"<p>Hi {first},</p>
<p>We've responded to your question about <strong>{name}</strong>:</p>
<div style="background: #f5f5f5; padding: 16px 20px; border-radius: 8px; margin: 16px 0;">
  <p style="margin: 0; color: #666; font-style: italic;">&ldquo;{question}&rdquo;</p>
</div>
<div style="background: #f0fdf0; padding: 16px 20px; border-radius: 8px; border-left: 4px solid #03FF00; margin: 16px 0;">
  <p style="margin: 0;">{reply}</p>
</div>
<p>Have more questions? Submit them through your portal.</p>
{button}
<p>Best,<br /><strong>The Botmakers Team</strong></p>"#,
            first = first,
            name = project.name,
            question = question.question_text,
            reply = question.reply_text.as_deref().unwrap_or_default(),
            button = Self::button("Open Portal", &portal_url),
        );

        let subject = format!("Re: Your question about {}", project.name);
        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&project.client_email),
            &subject,
            html,
            None,
        )
        .await
    }

    pub async fn send_client_question_alert(
        &self,
        project: &Project,
        question_text: &str,
    ) -> anyhow::Result<()> {
        let subject = format!(
            "[Client Question] {} asked about {}",
            project.client_name, project.name
        );
        let admin_url = format!("{}/admin/projects/{}", self.site_url, project.id);

        let content = format!(
            r#"<p><strong>{client}</strong> submitted a question about <strong>{name}</strong>:</p>
<div style="background: #f5f5f5; padding: 16px 20px; border-radius: 8px; border-left: 4px solid #033457; margin: 24px 0;">
  <p style="margin: 0;">{question}</p>
</div>
{button}"#,
            client = project.client_name,
            name = project.name,
            question = question_text,
            button = Self::button("Reply in Admin", &admin_url),
        );

        let html = self.wrap(&content);
        self.send(&self.from_leads, &self.team, &subject, html, None)
            .await
    }

    pub async fn send_welcome(&self, project: &Project) -> anyhow::Result<()> {
        let first = first_name(&project.client_name);
        let login_url = format!("{}/portal/login", self.site_url);

        let content = format!(
            r#"<p>Hi {first},</p>
<p>Welcome to Botmakers.ai! We're excited to start working on <strong>{name}</strong> with you.</p>
<p>We've set up a project portal where you can:</p>
<ul style="line-height: 1.8;">
  <li>Track your project's progress and milestones</li>
  <li>View live demos as they become available</li>
  <li>Submit questions and get replies from our team</li>
</ul>
<p>To access your portal, simply enter your email address and we'll send you a magic link &mdash; no password needed.</p>
{button}
<p style="color: #666; font-size: 14px;">If you have any questions, reply to this email or contact us at info@botmakers.ai.</p>
<p>Best,<br /><strong>The Botmakers Team</strong></p>"#,
            first = first,
            name = project.name,
            button = Self::button("Access Your Portal", &login_url),
        );

        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            std::slice::from_ref(&project.client_email),
            "Welcome — Your Project Portal",
            html,
            None,
        )
        .await
    }

    pub async fn send_magic_link(&self, client_email: &str, link: &str) -> anyhow::Result<()> {
        let content = format!(
            r#"<p>Hi,</p>
<p>Here is your secure sign-in link for the Botmakers project portal. It signs you in as <strong>{client_email}</strong>.</p>
{button}
<p style="color: #666; font-size: 14px;">If you didn't request this link, you can safely ignore this email.</p>"#,
            button = Self::button("Open My Portal", link),
        );

        let html = self.wrap(&content);
        self.send(
            &self.from_info,
            &[client_email.to_string()],
            "Your Botmakers portal sign-in link",
            html,
            None,
        )
        .await
    }
}
