//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccessTokenVerifier, AccountCommand, AccountProfileCommand, PortfolioCollection,
    PortfolioProfileCommand,
};
use crate::domain::{Education, Experience, Project, Skill};

/// Identity ports.
#[derive(Clone)]
pub struct AccountPorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_profile: Arc<dyn AccountProfileCommand>,
    pub verifier: Arc<dyn AccessTokenVerifier>,
}

/// Portfolio ports: the profile plus its four collections.
#[derive(Clone)]
pub struct PortfolioPorts {
    pub profiles: Arc<dyn PortfolioProfileCommand>,
    pub skills: Arc<dyn PortfolioCollection<Skill>>,
    pub projects: Arc<dyn PortfolioCollection<Project>>,
    pub experiences: Arc<dyn PortfolioCollection<Experience>>,
    pub education: Arc<dyn PortfolioCollection<Education>>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_profile: Arc<dyn AccountProfileCommand>,
    pub verifier: Arc<dyn AccessTokenVerifier>,
    pub portfolio_profiles: Arc<dyn PortfolioProfileCommand>,
    pub skills: Arc<dyn PortfolioCollection<Skill>>,
    pub projects: Arc<dyn PortfolioCollection<Project>>,
    pub experiences: Arc<dyn PortfolioCollection<Experience>>,
    pub education: Arc<dyn PortfolioCollection<Education>>,
}

impl HttpState {
    /// Assemble the state from its two port groups.
    pub fn new(accounts: AccountPorts, portfolio: PortfolioPorts) -> Self {
        let AccountPorts {
            accounts,
            account_profile,
            verifier,
        } = accounts;
        let PortfolioPorts {
            profiles,
            skills,
            projects,
            experiences,
            education,
        } = portfolio;
        Self {
            accounts,
            account_profile,
            verifier,
            portfolio_profiles: profiles,
            skills,
            projects,
            experiences,
            education,
        }
    }
}
