//! Password strength rules applied on registration, reset and change.
//!
//! The rules mirror the usual web-framework validators: a minimum length, no
//! purely numeric passwords, a deny-list of common choices and a similarity
//! check against the account's own username and email.

use super::user::{EmailAddress, Username};

/// Minimum number of characters a password must have.
pub const PASSWORD_MIN_LENGTH: usize = 8;
/// Similarity ratio at or above which a password is rejected.
const MAX_SIMILARITY_PERCENT: usize = 70;
/// Inputs longer than this skip the similarity check.
const SIMILARITY_INPUT_LIMIT: usize = 256;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "123456789", "12345678", "password", "qwerty", "qwerty123", "1q2w3e4r",
    "111111", "1234567890", "1234567", "password1", "password123", "abc123", "iloveyou",
    "000000", "123123", "admin", "admin123", "welcome", "welcome1", "letmein", "monkey",
    "dragon", "football", "baseball", "sunshine", "princess", "trustno1", "passw0rd",
    "master", "hello123", "freedom", "whatever", "qazwsx", "zaq12wsx", "starwars",
    "superman", "batman", "shadow", "michael", "jennifer", "charlie", "secret",
    "changeme", "login", "p@ssw0rd", "qwertyuiop", "asdfghjkl", "zxcvbnm",
];

/// A single policy violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyViolation {
    #[error("This password is too short. It must contain at least {min} characters.")]
    TooShort { min: usize },
    #[error("This password is entirely numeric.")]
    EntirelyNumeric,
    #[error("This password is too common.")]
    TooCommon,
    #[error("The password is too similar to the {attribute}.")]
    TooSimilar { attribute: &'static str },
}

/// Account attributes a password must not resemble.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordContext<'a> {
    pub username: Option<&'a Username>,
    pub email: Option<&'a EmailAddress>,
}

impl<'a> PasswordContext<'a> {
    /// Context for an account with both attributes known.
    pub fn for_account(username: &'a Username, email: &'a EmailAddress) -> Self {
        Self {
            username: Some(username),
            email: Some(email),
        }
    }
}

/// Check `password` against every rule, returning all violations.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::{PasswordContext, check_password};
///
/// assert!(check_password("Str0ng!Pass", PasswordContext::default()).is_ok());
/// assert!(check_password("12345678", PasswordContext::default()).is_err());
/// ```
pub fn check_password(
    password: &str,
    context: PasswordContext<'_>,
) -> Result<(), Vec<PasswordPolicyViolation>> {
    let mut violations = Vec::new();

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        violations.push(PasswordPolicyViolation::TooShort {
            min: PASSWORD_MIN_LENGTH,
        });
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.push(PasswordPolicyViolation::EntirelyNumeric);
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.trim()) {
        violations.push(PasswordPolicyViolation::TooCommon);
    }
    if let Some(attribute) = similar_attribute(&lowered, context) {
        violations.push(PasswordPolicyViolation::TooSimilar { attribute });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn similar_attribute(lowered: &str, context: PasswordContext<'_>) -> Option<&'static str> {
    let candidates = [
        ("username", context.username.map(Username::as_str)),
        ("email address", context.email.map(EmailAddress::as_str)),
        ("email address", context.email.map(EmailAddress::local_part)),
    ];
    candidates.into_iter().find_map(|(attribute, value)| {
        let value = value?.to_lowercase();
        is_similar(lowered, &value).then_some(attribute)
    })
}

fn is_similar(password: &str, attribute: &str) -> bool {
    let left: Vec<char> = password.chars().collect();
    let right: Vec<char> = attribute.chars().collect();
    if left.is_empty() || right.is_empty() {
        return false;
    }
    if left.len() > SIMILARITY_INPUT_LIMIT || right.len() > SIMILARITY_INPUT_LIMIT {
        return false;
    }
    let common = longest_common_run(&left, &right);
    common * 2 * 100 >= MAX_SIMILARITY_PERCENT * (left.len() + right.len())
}

/// Length of the longest contiguous run shared by both inputs.
fn longest_common_run(left: &[char], right: &[char]) -> usize {
    let mut previous = vec![0_usize; right.len() + 1];
    let mut best = 0;
    for l in left {
        let mut current = vec![0_usize; right.len() + 1];
        for (j, r) in right.iter().enumerate() {
            if l == r {
                let run = previous.get(j).copied().unwrap_or(0) + 1;
                if let Some(slot) = current.get_mut(j + 1) {
                    *slot = run;
                }
                best = best.max(run);
            }
        }
        previous = current;
    }
    best
}
