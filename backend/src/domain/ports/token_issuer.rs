//! Port for minting and verifying bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::{RefreshClaims, RefreshTokenId, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised while minting or verifying tokens.
    pub enum TokenError {
        /// The token is malformed, has a bad signature or the wrong type.
        Invalid { message: String } => "token invalid: {message}",
        /// The token's expiry has passed.
        Expired => "token expired",
        /// The token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// A signed refresh token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless token codec. Refresh token revocation lives in the
/// [`super::RefreshTokenRepository`].
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Mint a short-lived access token for `user_id`.
    fn issue_access(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String, TokenError>;

    /// Mint a refresh token identified by `id`.
    fn issue_refresh(
        &self,
        user_id: &UserId,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
    ) -> Result<IssuedRefreshToken, TokenError>;

    /// Verify an access token and return its subject.
    fn verify_access(&self, token: &str) -> Result<UserId, TokenError>;

    /// Verify a refresh token's signature, type and expiry.
    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError>;
}
