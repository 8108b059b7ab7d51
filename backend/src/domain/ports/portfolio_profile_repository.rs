//! Port for portfolio profile persistence.
//!
//! Reads are always keyed by owner. The only unscoped query is
//! [`PortfolioProfileRepository::profile_exists`], which lets the service
//! tell a foreign profile (forbidden) from a missing one (not found) without
//! ever loading another user's data.

use async_trait::async_trait;

use crate::domain::{PortfolioOverview, PortfolioProfile, ProfileDetails, ProfileId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by portfolio adapters.
    pub enum PortfolioPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "portfolio repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "portfolio repository query failed: {message}",
        /// The owner has no portfolio profile to attach records to.
        ProfileMissing => "portfolio profile missing for owner",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortfolioProfileRepository: Send + Sync {
    /// Load the owner's profile together with its owner and collections.
    async fn overview(
        &self,
        owner: &UserId,
    ) -> Result<Option<PortfolioOverview>, PortfolioPersistenceError>;

    /// Fetch the owner's profile row.
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<PortfolioProfile>, PortfolioPersistenceError>;

    /// Create an empty profile unless one exists; returns the stored row.
    async fn create_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<PortfolioProfile, PortfolioPersistenceError>;

    /// Whether any user owns a profile with this id.
    async fn profile_exists(&self, id: &ProfileId) -> Result<bool, PortfolioPersistenceError>;

    /// Overwrite the owner's editable fields and bump `updated_at`.
    async fn update_details(
        &self,
        owner: &UserId,
        details: &ProfileDetails,
    ) -> Result<Option<PortfolioProfile>, PortfolioPersistenceError>;
}
