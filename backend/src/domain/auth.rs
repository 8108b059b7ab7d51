//! Authentication primitives: credentials, registration input, password
//! changes and the tokens handed to clients.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::user::{EmailAddress, FullName, UserId, Username};
use super::validation::FieldErrors;

/// Message used when a password and its confirmation differ.
pub const PASSWORD_MISMATCH: &str = "Password fields didn't match.";

const RESET_TOKEN_BYTES: usize = 32;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("This field may not be blank.")]
    EmptyUsername,
    /// Password was blank.
    #[error("This field may not be blank.")]
    EmptyPassword,
}

impl LoginValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }
}

impl From<LoginValidationError> for FieldErrors {
    fn from(value: LoginValidationError) -> Self {
        Self::single(value.field(), value.to_string())
    }
}

/// A caller-supplied password held in a buffer that is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Wrap a raw password; whitespace is preserved.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Borrow the secret.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlainPassword(<redacted>)")
    }
}

/// Encoded password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a password hasher or read from storage.
    pub fn from_phc(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("alice", "Str0ng!Pass").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert_eq!(creds.password().expose(), "Str0ng!Pass");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: PlainPassword::new(password),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// Raw registration fields as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// A validated sign-up request.
///
/// Field checks only; uniqueness and password policy are the account
/// service's concern because they need repository or account context.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    full_name: FullName,
    password: PlainPassword,
}

impl Registration {
    /// Validate every field, reporting all failures at once.
    pub fn try_new(input: RegistrationInput) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let username = errors.check("username", Username::new(&input.username));
        let email = errors.check("email", EmailAddress::new(&input.email));
        let full_name = errors.check(
            "fullName",
            FullName::new(input.full_name.as_deref().unwrap_or_default()),
        );
        let password = PlainPassword::new(input.password);
        if password.is_blank() {
            errors.add("password", "This field may not be blank.");
        }

        match (username, email, full_name) {
            (Some(username), Some(email), Some(full_name)) if errors.is_empty() => Ok(Self {
                username,
                email,
                full_name,
                password,
            }),
            _ => Err(errors),
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// New password plus its confirmation, checked for equality.
#[derive(Debug, Clone)]
pub struct ConfirmedPassword(PlainPassword);

impl ConfirmedPassword {
    /// Validate that both entries are present and equal.
    ///
    /// `field` names the request member that errors are reported against.
    pub fn try_new(field: &str, password: &str, confirmation: &str) -> Result<Self, FieldErrors> {
        if password.is_empty() {
            return Err(FieldErrors::single(field, "This field may not be blank."));
        }
        if password != confirmation {
            return Err(FieldErrors::single(field, PASSWORD_MISMATCH));
        }
        Ok(Self(PlainPassword::new(password)))
    }

    pub fn password(&self) -> &PlainPassword {
        &self.0
    }
}

/// Request to replace a known password with a new one.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current: PlainPassword,
    pub replacement: ConfirmedPassword,
}

/// Access and refresh token handed to a client after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Identifier (`jti`) of an issued refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTokenId(Uuid);

impl RefreshTokenId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for RefreshTokenId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Bookkeeping record for an issued refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// Whether the token may still be exchanged at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

/// Claims recovered from a verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub id: RefreshTokenId,
    pub user_id: UserId,
}

/// Single-use secret sent to the user to authorise a password reset.
///
/// Only the [`ResetTokenDigest`] is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(Zeroizing<String>);

impl ResetToken {
    /// Generate a random token (64 hex characters).
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; RESET_TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(bytes.as_mut_slice());
        Self(Zeroizing::new(hex::encode(bytes.as_slice())))
    }

    /// Wrap a token received from a client.
    pub fn from_client(raw: &str) -> Result<Self, FieldErrors> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(FieldErrors::single("token", "This field may not be blank."));
        }
        Ok(Self(Zeroizing::new(value.to_owned())))
    }

    /// Borrow the secret, for delivery only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest stored in place of the secret.
    pub fn digest(&self) -> ResetTokenDigest {
        ResetTokenDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResetToken(<redacted>)")
    }
}

/// Hex-encoded SHA-256 digest of a [`ResetToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResetTokenDigest(String);

impl ResetTokenDigest {
    /// Rehydrate a stored digest.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
