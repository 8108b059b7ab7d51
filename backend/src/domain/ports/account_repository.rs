//! Port abstraction for identity persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Account, AccountPatch, EmailAddress, FullName, PasswordHash, ResetTokenDigest, User, UserId,
    Username,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Another identity already holds the username.
        DuplicateUsername => "username already taken",
        /// Another identity already holds the email address.
        DuplicateEmail => "email already taken",
    }
}

/// Everything needed to create an identity and its dependent profiles.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub full_name: FullName,
    pub password_hash: PasswordHash,
}

/// A user together with the hash needed to verify their password.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create the identity, its contact profile and its portfolio profile in
    /// one transaction.
    async fn create(&self, account: &NewAccount) -> Result<Account, AccountPersistenceError>;

    /// Fetch an identity with its contact profile.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountPersistenceError>;

    /// Fetch a user by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountPersistenceError>;

    /// Fetch credentials for an exact username.
    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError>;

    /// Fetch credentials for a user id.
    async fn credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError>;

    /// Whether a user other than `except` holds `username`.
    async fn username_taken(
        &self,
        username: &Username,
        except: Option<UserId>,
    ) -> Result<bool, AccountPersistenceError>;

    /// Whether a user other than `except` holds `email`.
    async fn email_taken(
        &self,
        email: &EmailAddress,
        except: Option<UserId>,
    ) -> Result<bool, AccountPersistenceError>;

    /// Apply a partial update; `None` when the user no longer exists.
    async fn update(
        &self,
        id: &UserId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, AccountPersistenceError>;

    /// Replace the stored password hash. Returns `false` for unknown users.
    async fn set_password(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, AccountPersistenceError>;

    /// Store a reset token digest, replacing any pending one.
    async fn store_reset_token(
        &self,
        id: &UserId,
        digest: &ResetTokenDigest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountPersistenceError>;

    /// Look up the credentials a pending, unexpired reset token belongs to.
    async fn credentials_by_reset_token(
        &self,
        digest: &ResetTokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError>;

    /// Atomically set the new hash and clear the token, provided the token
    /// is still pending. Returns `false` when it was already consumed.
    async fn consume_reset_token(
        &self,
        id: &UserId,
        digest: &ResetTokenDigest,
        hash: &PasswordHash,
    ) -> Result<bool, AccountPersistenceError>;

    /// Delete the identity and, by cascade, everything it owns.
    async fn delete(&self, id: &UserId) -> Result<bool, AccountPersistenceError>;
}
