//! Identity domain service.
//!
//! [`AccountService`] implements the identity driving ports on top of the
//! account and refresh token repositories plus the stateless security
//! adapters (token issuer, password hasher, reset notifier).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, error, info};

use crate::domain::ports::{
    AccessTokenVerifier, AccountCommand, AccountPersistenceError, AccountProfileCommand,
    AccountRepository, AuthSession, NewAccount, PasswordHashError, PasswordHasher,
    RefreshTokenPersistenceError, RefreshTokenRepository, ResetNotifier, StoredCredentials,
    TokenError, TokenIssuer,
};
use crate::domain::{
    Account, AccountPatch, ConfirmedPassword, EmailAddress, Error, FieldErrors,
    LoginCredentials, PasswordChange, PasswordContext, PasswordHash, PlainPassword,
    RefreshTokenId, RefreshTokenRecord, Registration, ResetToken, TokenPair, User, UserId,
    Username, check_password,
};

/// Lifetime of a password reset token, in seconds, unless configured
/// otherwise.
pub const DEFAULT_RESET_TOKEN_TTL_SECS: i64 = 3600;

pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub(crate) const EMAIL_TAKEN: &str = "A user with that email already exists.";
pub(crate) const UNKNOWN_USERNAME: &str = "No account found with the given username.";
pub(crate) const WRONG_PASSWORD: &str = "Incorrect password.";
pub(crate) const TOKEN_REJECTED: &str = "Token is invalid or expired.";
pub(crate) const RESET_TOKEN_REJECTED: &str = "Invalid or expired reset token.";
pub(crate) const OLD_PASSWORD_REJECTED: &str = "Your old password was entered incorrectly.";
pub(crate) const TOKEN_USER_MISSING: &str = "User not found";

/// Stateless security adapters used by [`AccountService`].
#[derive(Clone)]
pub struct AccountSecurity {
    pub tokens: Arc<dyn TokenIssuer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub notifier: Arc<dyn ResetNotifier>,
}

/// Identity service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<A, T> {
    accounts: Arc<A>,
    refresh_tokens: Arc<T>,
    security: AccountSecurity,
    clock: Arc<dyn Clock>,
    reset_ttl: TimeDelta,
}

impl<A, T> AccountService<A, T> {
    pub fn new(
        accounts: Arc<A>,
        refresh_tokens: Arc<T>,
        security: AccountSecurity,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            security,
            clock,
            reset_ttl: TimeDelta::seconds(DEFAULT_RESET_TOKEN_TTL_SECS),
        }
    }

    /// Override how long password reset tokens stay valid.
    #[must_use]
    pub fn with_reset_ttl(mut self, ttl: TimeDelta) -> Self {
        self.reset_ttl = ttl;
        self
    }
}

fn map_account_error(error: AccountPersistenceError) -> Error {
    match error {
        AccountPersistenceError::Connection { message } => {
            Error::store_unavailable("accounts", &message)
        }
        AccountPersistenceError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
        AccountPersistenceError::DuplicateUsername => {
            Error::validation(FieldErrors::single("username", USERNAME_TAKEN))
        }
        AccountPersistenceError::DuplicateEmail => {
            Error::validation(FieldErrors::single("email", EMAIL_TAKEN))
        }
    }
}

fn map_refresh_error(error: RefreshTokenPersistenceError) -> Error {
    match error {
        RefreshTokenPersistenceError::Connection { message } => {
            Error::store_unavailable("refresh_tokens", &message)
        }
        RefreshTokenPersistenceError::Query { message } => {
            Error::internal(format!("refresh token repository error: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Signing { message } => {
            Error::internal(format!("token signing failed: {message}"))
        }
        TokenError::Invalid { .. } | TokenError::Expired => Error::unauthorized(TOKEN_REJECTED),
    }
}

/// Run the password policy and report violations against `field`.
fn enforce_policy(
    errors: &mut FieldErrors,
    field: &str,
    password: &PlainPassword,
    context: PasswordContext<'_>,
) {
    if let Err(violations) = check_password(password.expose(), context) {
        for violation in violations {
            errors.add(field, violation.to_string());
        }
    }
}

impl<A, T> AccountService<A, T>
where
    A: AccountRepository,
    T: RefreshTokenRepository,
{
    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn issue_pair(&self, user_id: &UserId) -> Result<TokenPair, Error> {
        let now = self.now();
        let access = self
            .security
            .tokens
            .issue_access(user_id, now)
            .map_err(map_token_error)?;
        let id = RefreshTokenId::random();
        let refresh = self
            .security
            .tokens
            .issue_refresh(user_id, &id, now)
            .map_err(map_token_error)?;
        self.refresh_tokens
            .record(&RefreshTokenRecord {
                id,
                user_id: *user_id,
                issued_at: now,
                expires_at: refresh.expires_at,
                revoked_at: None,
            })
            .await
            .map_err(map_refresh_error)?;
        Ok(TokenPair {
            access,
            refresh: refresh.token,
        })
    }

    async fn load_account(&self, user_id: &UserId) -> Result<Account, Error> {
        self.accounts
            .find_by_id(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }

    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, Error> {
        self.security.hasher.hash(password).map_err(map_hash_error)
    }

    fn verify_password(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, Error> {
        self.security
            .hasher
            .verify(password, hash)
            .map_err(map_hash_error)
    }

    async fn revoke_sessions(&self, user_id: &UserId) -> Result<(), Error> {
        let revoked = self
            .refresh_tokens
            .revoke_all_for_user(user_id, self.now())
            .await
            .map_err(map_refresh_error)?;
        debug!(%user_id, revoked, "revoked refresh tokens after password change");
        Ok(())
    }

    /// Check uniqueness of a username and email, excluding `except`.
    async fn check_unique(
        &self,
        errors: &mut FieldErrors,
        username: Option<&Username>,
        email: Option<&EmailAddress>,
        except: Option<UserId>,
    ) -> Result<(), Error> {
        if let Some(username) = username {
            let taken = self
                .accounts
                .username_taken(username, except)
                .await
                .map_err(map_account_error)?;
            if taken {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        if let Some(email) = email {
            let taken = self
                .accounts
                .email_taken(email, except)
                .await
                .map_err(map_account_error)?;
            if taken {
                errors.add("email", EMAIL_TAKEN);
            }
        }
        Ok(())
    }

    async fn deliver_reset(&self, user: User) -> Result<(), Error> {
        let token = ResetToken::generate();
        let expires_at = self.now() + self.reset_ttl;
        self.accounts
            .store_reset_token(user.id(), &token.digest(), expires_at)
            .await
            .map_err(map_account_error)?;
        if let Err(err) = self
            .security
            .notifier
            .deliver(&user, &token, expires_at)
            .await
        {
            // The outcome is never reported to the caller.
            error!(user_id = %user.id(), error = %err, "password reset delivery failed");
        }
        Ok(())
    }

    fn password_context(credentials: &StoredCredentials) -> PasswordContext<'_> {
        PasswordContext::for_account(credentials.user.username(), credentials.user.email())
    }
}

#[async_trait]
impl<A, T> AccountCommand for AccountService<A, T>
where
    A: AccountRepository,
    T: RefreshTokenRepository,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let mut errors = FieldErrors::default();
        self.check_unique(
            &mut errors,
            Some(registration.username()),
            Some(registration.email()),
            None,
        )
        .await?;
        enforce_policy(
            &mut errors,
            "password",
            registration.password(),
            PasswordContext::for_account(registration.username(), registration.email()),
        );
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        let account = self
            .accounts
            .create(&NewAccount {
                id: UserId::random(),
                username: registration.username().clone(),
                email: registration.email().clone(),
                full_name: registration.full_name().clone(),
                password_hash: self.hash(registration.password())?,
            })
            .await
            .map_err(map_account_error)?;
        let tokens = self.issue_pair(account.user.id()).await?;
        info!(user_id = %account.user.id(), "account registered");
        Ok(AuthSession { account, tokens })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let stored = self
            .accounts
            .credentials_by_username(credentials.username())
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::unauthorized(UNKNOWN_USERNAME))?;
        if !self.verify_password(credentials.password(), &stored.password_hash)? {
            debug!(user_id = %stored.user.id(), "login rejected: wrong password");
            return Err(Error::unauthorized(WRONG_PASSWORD));
        }
        let account = self.load_account(stored.user.id()).await?;
        let tokens = self.issue_pair(stored.user.id()).await?;
        info!(user_id = %stored.user.id(), "login succeeded");
        Ok(AuthSession { account, tokens })
    }

    async fn logout(&self, user_id: &UserId, refresh: Option<String>) -> Result<(), Error> {
        let Some(raw) = refresh else {
            return Ok(());
        };
        let claims = match self.security.tokens.verify_refresh(&raw) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(%user_id, error = %err, "ignoring unusable refresh token on logout");
                return Ok(());
            }
        };
        if claims.user_id != *user_id {
            debug!(%user_id, "ignoring refresh token issued to another user");
            return Ok(());
        }
        self.refresh_tokens
            .revoke(&claims.id, self.now())
            .await
            .map_err(map_refresh_error)?;
        info!(%user_id, "logged out");
        Ok(())
    }

    async fn refresh(&self, refresh: &str) -> Result<TokenPair, Error> {
        let claims = self
            .security
            .tokens
            .verify_refresh(refresh)
            .map_err(map_token_error)?;
        let now = self.now();
        let record = self
            .refresh_tokens
            .find(&claims.id)
            .await
            .map_err(map_refresh_error)?;
        if !record.is_some_and(|stored| stored.is_active(now)) {
            return Err(Error::unauthorized(TOKEN_REJECTED));
        }
        // A concurrent refresh may win the revocation; only one rotation succeeds.
        let revoked = self
            .refresh_tokens
            .revoke(&claims.id, now)
            .await
            .map_err(map_refresh_error)?;
        if !revoked {
            return Err(Error::unauthorized(TOKEN_REJECTED));
        }
        self.issue_pair(&claims.user_id).await
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let email = EmailAddress::new(email)
            .map_err(|err| Error::validation(FieldErrors::single("email", err.to_string())))?;
        match self
            .accounts
            .find_by_email(&email)
            .await
            .map_err(map_account_error)?
        {
            Some(user) => self.deliver_reset(user).await,
            None => {
                debug!("password reset requested for unknown email");
                Ok(())
            }
        }
    }

    async fn confirm_password_reset(
        &self,
        token: ResetToken,
        password: ConfirmedPassword,
    ) -> Result<(), Error> {
        let digest = token.digest();
        let stored = self
            .accounts
            .credentials_by_reset_token(&digest, self.now())
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::validation(FieldErrors::single("token", RESET_TOKEN_REJECTED)))?;

        let mut errors = FieldErrors::default();
        enforce_policy(
            &mut errors,
            "newPassword",
            password.password(),
            Self::password_context(&stored),
        );
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        let hash = self.hash(password.password())?;
        let consumed = self
            .accounts
            .consume_reset_token(stored.user.id(), &digest, &hash)
            .await
            .map_err(map_account_error)?;
        if !consumed {
            return Err(Error::validation(FieldErrors::single(
                "token",
                RESET_TOKEN_REJECTED,
            )));
        }
        self.revoke_sessions(stored.user.id()).await?;
        info!(user_id = %stored.user.id(), "password reset completed");
        Ok(())
    }

    async fn change_password(&self, user_id: &UserId, change: PasswordChange) -> Result<(), Error> {
        let stored = self
            .accounts
            .credentials_by_id(user_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("account not found"))?;
        if !self.verify_password(&change.current, &stored.password_hash)? {
            return Err(Error::validation(FieldErrors::single(
                "oldPassword",
                OLD_PASSWORD_REJECTED,
            )));
        }

        let mut errors = FieldErrors::default();
        enforce_policy(
            &mut errors,
            "newPassword",
            change.replacement.password(),
            Self::password_context(&stored),
        );
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }

        let hash = self.hash(change.replacement.password())?;
        let updated = self
            .accounts
            .set_password(user_id, &hash)
            .await
            .map_err(map_account_error)?;
        if !updated {
            return Err(Error::not_found("account not found"));
        }
        self.revoke_sessions(user_id).await?;
        info!(%user_id, "password changed");
        Ok(())
    }
}

#[async_trait]
impl<A, T> AccountProfileCommand for AccountService<A, T>
where
    A: AccountRepository,
    T: RefreshTokenRepository,
{
    async fn get(&self, user_id: &UserId) -> Result<Account, Error> {
        self.load_account(user_id).await
    }

    async fn update(&self, user_id: &UserId, patch: AccountPatch) -> Result<Account, Error> {
        let mut errors = FieldErrors::default();
        self.check_unique(
            &mut errors,
            patch.username.as_ref(),
            patch.email.as_ref(),
            Some(*user_id),
        )
        .await?;
        if !errors.is_empty() {
            return Err(Error::validation(errors));
        }
        self.accounts
            .update(user_id, &patch)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found("account not found"))
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), Error> {
        let deleted = self
            .accounts
            .delete(user_id)
            .await
            .map_err(map_account_error)?;
        if !deleted {
            return Err(Error::not_found("account not found"));
        }
        info!(%user_id, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl<A, T> AccessTokenVerifier for AccountService<A, T>
where
    A: AccountRepository,
    T: RefreshTokenRepository,
{
    async fn verify(&self, token: &str) -> Result<UserId, Error> {
        let user_id = self
            .security
            .tokens
            .verify_access(token)
            .map_err(map_token_error)?;
        let account = self
            .accounts
            .find_by_id(&user_id)
            .await
            .map_err(map_account_error)?;
        if account.is_none() {
            debug!(%user_id, "access token presented for a deleted account");
            return Err(Error::unauthorized(TOKEN_USER_MISSING));
        }
        Ok(user_id)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
