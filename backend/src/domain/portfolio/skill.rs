//! Skill records: a single name per entry.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::{PortfolioRecord, ProfileId, RecordId, RecordKind, required_input};
use crate::domain::validation::{FieldErrors, required_text};

const NAME_MAX: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDraft {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SkillInput {
    pub name: Option<String>,
}

impl PortfolioRecord for Skill {
    type Draft = SkillDraft;
    type Input = SkillInput;

    const KIND: RecordKind = RecordKind::Skill;

    fn id(&self) -> RecordId {
        self.id
    }

    fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    fn draft(&self) -> SkillDraft {
        SkillDraft {
            name: self.name.clone(),
        }
    }

    fn to_input(draft: &SkillDraft) -> SkillInput {
        SkillInput {
            name: Some(draft.name.clone()),
        }
    }

    fn overlay(input: SkillInput, base: SkillInput) -> SkillInput {
        SkillInput {
            name: input.name.or(base.name),
        }
    }

    fn validate(input: SkillInput) -> Result<SkillDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = required_input(&mut errors, "name", input.name.as_deref())
            .and_then(|raw| errors.check("name", required_text(raw, NAME_MAX)));
        match name {
            Some(name) => Ok(SkillDraft { name }),
            None => Err(errors),
        }
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.created_at.cmp(&other.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::REQUIRED_MESSAGE;
    use rstest::rstest;

    #[rstest]
    fn missing_name_is_required() {
        let errors = Skill::validate(SkillInput::default()).expect_err("name missing");
        assert_eq!(errors.messages("name"), [REQUIRED_MESSAGE.to_owned()]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_name_is_rejected(#[case] name: &str) {
        let errors = Skill::validate(SkillInput {
            name: Some(name.into()),
        })
        .expect_err("blank name");
        assert!(errors.contains("name"));
    }

    #[rstest]
    fn long_names_are_rejected() {
        let errors = Skill::validate(SkillInput {
            name: Some("x".repeat(NAME_MAX + 1)),
        })
        .expect_err("name too long");
        assert!(errors.contains("name"));
    }

    #[rstest]
    fn overlay_keeps_base_when_unset() {
        let base = Skill::to_input(&SkillDraft { name: "Rust".into() });
        let merged = Skill::overlay(SkillInput::default(), base);
        assert_eq!(
            Skill::validate(merged).expect("valid"),
            SkillDraft { name: "Rust".into() }
        );
    }
}
