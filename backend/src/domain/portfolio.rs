//! Portfolio domain: the public profile and the four record collections it
//! owns.
//!
//! Every collection record implements [`PortfolioRecord`], which lets one
//! service, one repository port and one set of HTTP handlers serve all four
//! collections. Validation works on a raw, all-optional `Input` so the same
//! code path serves create, full replace and partial update.

mod education;
mod experience;
mod profile;
mod project;
mod skill;

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use super::validation::FieldErrors;

pub use education::{Education, EducationDraft, EducationInput};
pub use experience::{Experience, ExperienceDraft, ExperienceInput};
pub use profile::{PortfolioOverview, PortfolioProfile, ProfileDetails, ProfilePatch, ProfilePatchInput};
pub use project::{Project, ProjectDraft, ProjectInput, Technology};
pub use skill::{Skill, SkillDraft, SkillInput};

/// Message used when a required field is absent from the payload.
pub const REQUIRED_MESSAGE: &str = "This field is required.";
/// Message used when a date does not parse.
pub const DATE_FORMAT_MESSAGE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a portfolio profile.
    ProfileId
);
uuid_newtype!(
    /// Identifier of a record inside one of the portfolio collections.
    RecordId
);

/// The four owner-scoped collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Skill,
    Project,
    Experience,
    Education,
}

impl RecordKind {
    /// Singular label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Project => "project",
            Self::Experience => "experience",
            Self::Education => "education",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record owned, through its profile, by exactly one user.
pub trait PortfolioRecord: Clone + fmt::Debug + Send + Sync + 'static {
    /// Validated field values, free of identity and timestamps.
    type Draft: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;
    /// Raw client input; `None` means "not supplied".
    type Input: Clone + fmt::Debug + Default + Send + Sync + 'static;

    const KIND: RecordKind;

    fn id(&self) -> RecordId;

    fn profile_id(&self) -> ProfileId;

    /// Current field values of the record.
    fn draft(&self) -> Self::Draft;

    /// Express a draft as fully supplied input, so partial updates can be
    /// overlaid on it.
    fn to_input(draft: &Self::Draft) -> Self::Input;

    /// Fill every field `input` leaves unset from `base`.
    fn overlay(input: Self::Input, base: Self::Input) -> Self::Input;

    /// Validate a complete payload.
    fn validate(input: Self::Input) -> Result<Self::Draft, FieldErrors>;

    /// Ordering used when listing a collection.
    fn listing_order(&self, other: &Self) -> Ordering;
}

/// Employment or study period shared by experience and education entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
}

impl Period {
    fn to_input(self) -> (Option<String>, Option<Option<String>>, Option<bool>) {
        (
            Some(self.start_date.to_string()),
            Some(self.end_date.map(|date| date.to_string())),
            Some(self.current),
        )
    }

    /// Validate the raw date fields of an input.
    fn validate(
        errors: &mut FieldErrors,
        start: Option<&str>,
        end: Option<Option<&str>>,
        current: Option<bool>,
    ) -> Option<Self> {
        let start_date = match start {
            Some(raw) => errors.check("startDate", parse_date(raw)),
            None => {
                errors.add("startDate", REQUIRED_MESSAGE);
                None
            }
        };
        let end_date = match end.flatten() {
            Some(raw) if !raw.trim().is_empty() => errors.check("endDate", parse_date(raw)).map(Some),
            _ => Some(None),
        };
        let (start_date, end_date) = (start_date?, end_date?);
        if let Some(end) = end_date {
            if end < start_date {
                errors.add("endDate", "End date must not be before the start date.");
                return None;
            }
        }
        Some(Self {
            start_date,
            end_date,
            current: current.unwrap_or(false),
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Date has wrong format. Use one of these formats instead: YYYY-MM-DD.")]
struct DateFormatError;

fn parse_date(raw: &str) -> Result<NaiveDate, DateFormatError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| DateFormatError)
}

/// Take a supplied text value or report it as missing.
fn required_input<'a>(errors: &mut FieldErrors, field: &str, value: Option<&'a str>) -> Option<&'a str> {
    if value.is_none() {
        errors.add(field, REQUIRED_MESSAGE);
    }
    value
}

/// Newest start date first; later-created first on ties.
fn newest_period_first(
    left: (&Period, chrono::DateTime<chrono::Utc>),
    right: (&Period, chrono::DateTime<chrono::Utc>),
) -> Ordering {
    right
        .0
        .start_date
        .cmp(&left.0.start_date)
        .then_with(|| right.1.cmp(&left.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn period_requires_a_start_date() {
        let mut errors = FieldErrors::default();
        assert!(Period::validate(&mut errors, None, None, None).is_none());
        assert_eq!(errors.messages("startDate"), [REQUIRED_MESSAGE.to_owned()]);
    }

    #[rstest]
    fn period_rejects_malformed_dates() {
        let mut errors = FieldErrors::default();
        let period = Period::validate(&mut errors, Some("2024-13-01"), Some(Some("soon")), None);
        assert!(period.is_none());
        assert!(errors.contains("startDate"));
        assert!(errors.contains("endDate"));
    }

    #[rstest]
    fn period_rejects_end_before_start() {
        let mut errors = FieldErrors::default();
        let period = Period::validate(&mut errors, Some("2024-05-01"), Some(Some("2023-01-01")), None);
        assert!(period.is_none());
        assert!(errors.contains("endDate"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(None))]
    #[case(Some(Some("")))]
    fn period_treats_missing_end_as_open(#[case] end: Option<Option<&str>>) {
        let mut errors = FieldErrors::default();
        let period = Period::validate(&mut errors, Some("2024-05-01"), end, Some(true))
            .expect("valid period");
        assert_eq!(period.end_date, None);
        assert!(period.current);
    }

    #[rstest]
    fn period_round_trips_through_input() {
        let period = Period {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 31).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2021, 6, 1),
            current: false,
        };
        let (start, end, current) = period.to_input();
        let mut errors = FieldErrors::default();
        let back = Period::validate(
            &mut errors,
            start.as_deref(),
            end.as_ref().map(Option::as_deref),
            current,
        );
        assert_eq!(back, Some(period));
    }
}
