//! The public-facing portfolio profile.

use chrono::{DateTime, Utc};

use super::{Education, Experience, ProfileId, Project, Skill};
use crate::domain::user::{User, UserId};
use crate::domain::validation::{FieldErrors, optional_text, optional_url};

const TITLE_MAX: usize = 100;
const LOCATION_MAX: usize = 100;
const PHONE_MAX: usize = 20;

/// Editable profile fields. Blank strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub avatar: String,
    pub title: String,
    pub bio: String,
    pub location: String,
    pub phone: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
}

/// One portfolio profile per user.
///
/// ## Invariants
/// - `created_at` and `updated_at` are assigned by the store only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioProfile {
    pub id: ProfileId,
    pub owner: UserId,
    pub details: ProfileDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A profile together with its owner and every owned collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioOverview {
    pub profile: PortfolioProfile,
    pub owner: User,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatchInput {
    pub avatar: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

/// Validated partial update of [`ProfileDetails`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch(ProfilePatchInput);

impl ProfilePatch {
    /// Validate and normalise the supplied fields.
    pub fn try_new(input: ProfilePatchInput) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let text = |errors: &mut FieldErrors, field: &str, raw: Option<String>, max: usize| {
            raw.and_then(|value| errors.check(field, optional_text(&value, max)))
        };
        let link = |errors: &mut FieldErrors, field: &str, raw: Option<String>| {
            raw.and_then(|value| errors.check(field, optional_url(&value)))
        };

        let normalised = ProfilePatchInput {
            avatar: input.avatar.map(|value| value.trim().to_owned()),
            title: text(&mut errors, "title", input.title, TITLE_MAX),
            bio: input.bio.map(|value| value.trim().to_owned()),
            location: text(&mut errors, "location", input.location, LOCATION_MAX),
            phone: text(&mut errors, "phone", input.phone, PHONE_MAX),
            website: link(&mut errors, "website", input.website),
            github: link(&mut errors, "github", input.github),
            linkedin: link(&mut errors, "linkedin", input.linkedin),
            twitter: link(&mut errors, "twitter", input.twitter),
        };
        errors.into_result(Self(normalised))
    }

    /// Merge supplied fields into `details`, leaving the rest untouched.
    pub fn apply(&self, details: &mut ProfileDetails) {
        let patch = &self.0;
        let slots = [
            (&patch.avatar, &mut details.avatar),
            (&patch.title, &mut details.title),
            (&patch.bio, &mut details.bio),
            (&patch.location, &mut details.location),
            (&patch.phone, &mut details.phone),
            (&patch.website, &mut details.website),
            (&patch.github, &mut details.github),
            (&patch.linkedin, &mut details.linkedin),
            (&patch.twitter, &mut details.twitter),
        ];
        for (update, slot) in slots {
            if let Some(value) = update {
                slot.clone_from(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn partial_update_keeps_omitted_fields() {
        let mut details = ProfileDetails {
            title: "Engineer".into(),
            bio: "Writes Rust".into(),
            github: "https://github.com/alice".into(),
            ..ProfileDetails::default()
        };
        let patch = ProfilePatch::try_new(ProfilePatchInput {
            bio: Some("Writes more Rust".into()),
            ..ProfilePatchInput::default()
        })
        .expect("valid patch");

        patch.apply(&mut details);

        assert_eq!(details.title, "Engineer");
        assert_eq!(details.bio, "Writes more Rust");
        assert_eq!(details.github, "https://github.com/alice");
    }

    #[rstest]
    #[case("website")]
    #[case("github")]
    #[case("linkedin")]
    #[case("twitter")]
    fn link_fields_require_urls(#[case] field: &str) {
        let mut input = ProfilePatchInput::default();
        let raw = Some("not a link".to_owned());
        match field {
            "website" => input.website = raw,
            "github" => input.github = raw,
            "linkedin" => input.linkedin = raw,
            _ => input.twitter = raw,
        }
        let errors = ProfilePatch::try_new(input).expect_err("invalid link");
        assert!(errors.contains(field));
    }

    #[rstest]
    fn over_long_phone_is_rejected() {
        let errors = ProfilePatch::try_new(ProfilePatchInput {
            phone: Some("1".repeat(PHONE_MAX + 1)),
            ..ProfilePatchInput::default()
        })
        .expect_err("phone too long");
        assert!(errors.contains("phone"));
    }
}
