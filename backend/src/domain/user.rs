//! Identity data model: who a user is and how they are addressed.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a username.
pub const USERNAME_MAX: usize = 150;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum length of the full (display) name.
pub const FULL_NAME_MAX: usize = 150;

/// Validation errors raised by the identity value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("This field may not be blank.")]
    Blank,
    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },
    #[error(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    )]
    UsernameInvalidCharacters,
    #[error("Enter a valid email address.")]
    InvalidEmail,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            /// Borrow the validated value.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = UserValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern compiles"));

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]+$").expect("email pattern compiles")
});

/// Unique login name: letters, digits and `@ . + - _`, at most 150 chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`]; surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = raw.as_ref().trim();
        if value.is_empty() {
            return Err(UserValidationError::Blank);
        }
        if value.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::TooLong { max: USERNAME_MAX });
        }
        if !USERNAME_RE.is_match(value) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(value.to_owned()))
    }
}

string_newtype!(Username);

/// Unique contact address, normalised to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use portfolio_backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new(" Alice@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_str(), "alice@example.com");
    /// assert!(EmailAddress::new("not-an-email").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = raw.as_ref().trim();
        if value.is_empty() {
            return Err(UserValidationError::Blank);
        }
        if value.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::TooLong { max: EMAIL_MAX });
        }
        if !EMAIL_RE.is_match(value) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value.to_lowercase()))
    }

    /// Part before the `@`, used by the password similarity check.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

string_newtype!(EmailAddress);

/// Free-form display name; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate a display name, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = raw.as_ref().trim();
        if value.chars().count() > FULL_NAME_MAX {
            return Err(UserValidationError::TooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(value.to_owned()))
    }
}

string_newtype!(FullName);

/// Application user.
///
/// ## Invariants
/// - `username` and `email` are unique across all users; enforced by the
///   repository.
/// - No credential material is ever held here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    full_name: FullName,
    joined_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(
        id: UserId,
        username: Username,
        email: EmailAddress,
        full_name: FullName,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            full_name,
            joined_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Contact address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name.
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Registration timestamp.
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice", true)]
    #[case("a.l+i-c_e@home", true)]
    #[case("  bob  ", true)]
    #[case("", false)]
    #[case("has space", false)]
    #[case("semi;colon", false)]
    fn username_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(Username::new(raw).is_ok(), ok, "input: {raw:?}");
    }

    #[rstest]
    fn username_rejects_overlong_values() {
        let raw = "a".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(raw),
            Err(UserValidationError::TooLong { max: USERNAME_MAX })
        );
    }

    #[rstest]
    #[case("a@x.com", Ok("a@x.com"))]
    #[case("A@X.Com", Ok("a@x.com"))]
    #[case("", Err(UserValidationError::Blank))]
    #[case("a@x", Err(UserValidationError::InvalidEmail))]
    #[case("a b@x.com", Err(UserValidationError::InvalidEmail))]
    fn email_validation(#[case] raw: &str, #[case] expected: Result<&str, UserValidationError>) {
        let actual = EmailAddress::new(raw).map(String::from);
        assert_eq!(actual, expected.map(str::to_owned));
    }

    #[rstest]
    fn email_local_part_is_exposed() {
        let email = EmailAddress::new("alice.smith@example.com").expect("valid email");
        assert_eq!(email.local_part(), "alice.smith");
    }

    #[rstest]
    fn full_name_may_be_empty() {
        let name = FullName::new("   ").expect("blank names are allowed");
        assert_eq!(name.as_str(), "");
    }

    #[rstest]
    fn user_id_round_trips_through_serde() {
        let id = UserId::random();
        let json = serde_json::to_string(&id).expect("serialise id");
        let back: UserId = serde_json::from_str(&json).expect("deserialise id");
        assert_eq!(back, id);
    }

    #[rstest]
    #[case("")]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("not-a-uuid")]
    fn user_id_rejects_invalid_input(#[case] raw: &str) {
        assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
    }
}
