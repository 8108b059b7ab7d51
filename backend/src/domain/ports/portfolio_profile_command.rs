//! Driving port for the portfolio profile.

use async_trait::async_trait;

use crate::domain::{Error, PortfolioOverview, ProfileId, ProfilePatch, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortfolioProfileCommand: Send + Sync {
    /// Profiles visible to the caller: only their own.
    async fn list(&self, owner: &UserId) -> Result<Vec<PortfolioOverview>, Error>;

    /// The caller's profile, created on first access.
    async fn get_mine(&self, owner: &UserId) -> Result<PortfolioOverview, Error>;

    /// A profile by id. Another user's profile is reported as not found.
    async fn get(&self, owner: &UserId, id: &ProfileId) -> Result<PortfolioOverview, Error>;

    /// Merge supplied fields into the caller's profile.
    async fn update_mine(&self, owner: &UserId, patch: ProfilePatch)
    -> Result<PortfolioOverview, Error>;

    /// Merge supplied fields into a profile by id. Another user's profile is
    /// forbidden.
    async fn update(
        &self,
        owner: &UserId,
        id: &ProfileId,
        patch: ProfilePatch,
    ) -> Result<PortfolioOverview, Error>;
}
