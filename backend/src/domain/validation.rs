//! Field-level validation helpers shared by the domain value types.
//!
//! Validation failures are collected per field so adapters can return a
//! complete field → messages map instead of stopping at the first problem.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Message used when a required text field is blank.
pub const BLANK_MESSAGE: &str = "This field may not be blank.";
/// Message used when a URL field does not parse as an absolute http(s) URL.
pub const INVALID_URL_MESSAGE: &str = "Enter a valid URL.";

/// Validation messages keyed by field name.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::FieldErrors;
///
/// let mut errors = FieldErrors::default();
/// errors.add("name", "This field may not be blank.");
/// assert!(errors.contains("name"));
/// assert!(errors.clone().into_result(()).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Shorthand for a map holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Append a message for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Record the outcome of a field check, keeping the value on success.
    pub fn check<T, E: fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, err.to_string());
                None
            }
        }
    }

    /// Fold another set of messages into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Whether no field has failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `field` has at least one message.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Return `value` when no field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// A single field check failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("This field may not be blank.")]
    Blank,
    #[error("Ensure this field has no more than {max} characters.")]
    TooLong { max: usize },
    #[error("Enter a valid URL.")]
    InvalidUrl,
}

/// Trim `raw` and enforce a maximum length; blank values are allowed.
pub fn optional_text(raw: &str, max: usize) -> Result<String, TextError> {
    let value = raw.trim();
    if value.chars().count() > max {
        return Err(TextError::TooLong { max });
    }
    Ok(value.to_owned())
}

/// Trim `raw`, reject blanks and enforce a maximum length.
pub fn required_text(raw: &str, max: usize) -> Result<String, TextError> {
    let value = optional_text(raw, max)?;
    if value.is_empty() {
        return Err(TextError::Blank);
    }
    Ok(value)
}

/// Unbounded text that must not be blank.
pub fn required_body(raw: &str) -> Result<String, TextError> {
    required_text(raw, usize::MAX)
}

/// Blank, or an absolute `http`/`https` URL.
pub fn optional_url(raw: &str) -> Result<String, TextError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(value.to_owned())
        }
        _ => Err(TextError::InvalidUrl),
    }
}

/// Like [`optional_url`] but maps blanks to `None`.
pub fn nullable_url(raw: Option<&str>) -> Result<Option<String>, TextError> {
    match raw {
        None => Ok(None),
        Some(value) => optional_url(value).map(|url| (!url.is_empty()).then_some(url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Rust  ", 50, Ok("Rust"))]
    #[case("", 50, Err(TextError::Blank))]
    #[case("   ", 50, Err(TextError::Blank))]
    #[case("abcdef", 5, Err(TextError::TooLong { max: 5 }))]
    fn required_text_cases(
        #[case] raw: &str,
        #[case] max: usize,
        #[case] expected: Result<&str, TextError>,
    ) {
        assert_eq!(required_text(raw, max), expected.map(str::to_owned));
    }

    #[rstest]
    #[case("", Ok(""))]
    #[case("https://example.com/me", Ok("https://example.com/me"))]
    #[case("ftp://example.com", Err(TextError::InvalidUrl))]
    #[case("not a url", Err(TextError::InvalidUrl))]
    fn optional_url_cases(#[case] raw: &str, #[case] expected: Result<&str, TextError>) {
        assert_eq!(optional_url(raw), expected.map(str::to_owned));
    }

    #[rstest]
    fn nullable_url_maps_blank_to_none() {
        assert_eq!(nullable_url(Some("  ")), Ok(None));
        assert_eq!(nullable_url(None), Ok(None));
    }

    #[rstest]
    fn check_collects_messages_per_field() {
        let mut errors = FieldErrors::default();
        let kept = errors.check("title", required_text("ok", 10));
        let dropped = errors.check("bio", required_text("", 10));

        assert_eq!(kept.as_deref(), Some("ok"));
        assert!(dropped.is_none());
        assert_eq!(errors.messages("bio"), [BLANK_MESSAGE.to_owned()]);
        assert!(!errors.contains("title"));
    }

    #[rstest]
    fn merge_appends_messages() {
        let mut left = FieldErrors::single("email", "first");
        left.merge(FieldErrors::single("email", "second"));
        assert_eq!(left.messages("email").len(), 2);
        assert_eq!(left.to_string(), "email: first; email: second");
    }
}
