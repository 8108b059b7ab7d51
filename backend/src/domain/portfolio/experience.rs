//! Work experience entries, listed newest start date first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::{Period, PortfolioRecord, ProfileId, RecordId, RecordKind, newest_period_first, required_input};
use crate::domain::validation::{FieldErrors, required_body, required_text};

const NAME_MAX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experience {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub company: String,
    pub position: String,
    pub description: String,
    pub period: Period,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceDraft {
    pub company: String,
    pub position: String,
    pub description: String,
    pub period: Period,
}

#[derive(Debug, Clone, Default)]
pub struct ExperienceInput {
    pub company: Option<String>,
    pub position: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<Option<String>>,
    pub current: Option<bool>,
}

impl PortfolioRecord for Experience {
    type Draft = ExperienceDraft;
    type Input = ExperienceInput;

    const KIND: RecordKind = RecordKind::Experience;

    fn id(&self) -> RecordId {
        self.id
    }

    fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    fn draft(&self) -> ExperienceDraft {
        ExperienceDraft {
            company: self.company.clone(),
            position: self.position.clone(),
            description: self.description.clone(),
            period: self.period,
        }
    }

    fn to_input(draft: &ExperienceDraft) -> ExperienceInput {
        let (start_date, end_date, current) = draft.period.to_input();
        ExperienceInput {
            company: Some(draft.company.clone()),
            position: Some(draft.position.clone()),
            description: Some(draft.description.clone()),
            start_date,
            end_date,
            current,
        }
    }

    fn overlay(input: ExperienceInput, base: ExperienceInput) -> ExperienceInput {
        ExperienceInput {
            company: input.company.or(base.company),
            position: input.position.or(base.position),
            description: input.description.or(base.description),
            start_date: input.start_date.or(base.start_date),
            end_date: input.end_date.or(base.end_date),
            current: input.current.or(base.current),
        }
    }

    fn validate(input: ExperienceInput) -> Result<ExperienceDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        let company = required_input(&mut errors, "company", input.company.as_deref())
            .and_then(|raw| errors.check("company", required_text(raw, NAME_MAX)));
        let position = required_input(&mut errors, "position", input.position.as_deref())
            .and_then(|raw| errors.check("position", required_text(raw, NAME_MAX)));
        let description = required_input(&mut errors, "description", input.description.as_deref())
            .and_then(|raw| errors.check("description", required_body(raw)));
        let period = Period::validate(
            &mut errors,
            input.start_date.as_deref(),
            input.end_date.as_ref().map(Option::as_deref),
            input.current,
        );

        match (company, position, description, period) {
            (Some(company), Some(position), Some(description), Some(period)) => {
                Ok(ExperienceDraft {
                    company,
                    position,
                    description,
                    period,
                })
            }
            _ => Err(errors),
        }
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        newest_period_first((&self.period, self.created_at), (&other.period, other.created_at))
    }
}
