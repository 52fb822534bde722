pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod referral_repo;
pub use referral_repo::ReferralRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
