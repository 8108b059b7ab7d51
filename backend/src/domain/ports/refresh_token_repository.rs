//! Port for the refresh token ledger used to blacklist tokens on logout.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{RefreshTokenId, RefreshTokenRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by refresh token adapters.
    pub enum RefreshTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "refresh token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "refresh token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Record a newly issued token.
    async fn record(&self, token: &RefreshTokenRecord) -> Result<(), RefreshTokenPersistenceError>;

    /// Fetch a token by its identifier.
    async fn find(
        &self,
        id: &RefreshTokenId,
    ) -> Result<Option<RefreshTokenRecord>, RefreshTokenPersistenceError>;

    /// Blacklist a token. Returns `false` if it was unknown or already
    /// revoked.
    async fn revoke(
        &self,
        id: &RefreshTokenId,
        at: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenPersistenceError>;

    /// Blacklist every outstanding token of a user, returning how many were
    /// revoked.
    async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<usize, RefreshTokenPersistenceError>;
}
