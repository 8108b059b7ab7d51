//! Driving ports for the identity domain.
//!
//! [`AccountCommand`] covers authentication and credential management,
//! [`AccountProfileCommand`] the signed-in user's own account record and
//! [`AccessTokenVerifier`] the bearer token check used by the HTTP
//! extractor.

use async_trait::async_trait;

use crate::domain::{
    Account, AccountPatch, ConfirmedPassword, Error, LoginCredentials, PasswordChange,
    Registration, ResetToken, TokenPair, UserId,
};

/// Result of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub account: Account,
    pub tokens: TokenPair,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an identity with both profiles and sign it in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Check credentials and issue a token pair.
    ///
    /// An unknown username and a wrong password fail with different
    /// messages.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Blacklist the caller's refresh token. Invalid, expired, foreign or
    /// absent tokens are ignored.
    async fn logout(&self, user_id: &UserId, refresh: Option<String>) -> Result<(), Error>;

    /// Exchange a live refresh token for a new pair, revoking the old one.
    async fn refresh(&self, refresh: &str) -> Result<TokenPair, Error>;

    /// Issue a reset token for the account owning `email`, if any.
    async fn request_password_reset(&self, email: &str) -> Result<(), Error>;

    /// Consume a reset token and set a new password.
    async fn confirm_password_reset(
        &self,
        token: ResetToken,
        password: ConfirmedPassword,
    ) -> Result<(), Error>;

    /// Replace the caller's password after checking the current one.
    async fn change_password(&self, user_id: &UserId, change: PasswordChange)
    -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountProfileCommand: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Account, Error>;

    /// Apply the supplied fields, re-checking username and email uniqueness
    /// against every other identity.
    async fn update(&self, user_id: &UserId, patch: AccountPatch) -> Result<Account, Error>;

    /// Delete the identity and everything it owns.
    async fn delete(&self, user_id: &UserId) -> Result<(), Error>;
}

/// Resolves a bearer access token to the identity it was issued for.
///
/// Tokens whose identity no longer exists are rejected as unauthorised.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessTokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<UserId, Error>;
}
