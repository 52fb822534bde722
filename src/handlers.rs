pub mod admin_ai;
pub mod admin_leads;
pub mod admin_projects;
pub mod admin_referrals;
pub mod leads;
pub mod metrics;
pub mod portal;
pub mod referrals;
pub mod webhooks;
