pub mod ai;
pub mod lead_service;
pub mod mailer;
pub mod project_service;
pub mod rate_limit;
pub mod referral_service;
pub mod sms;
pub mod tokens;
