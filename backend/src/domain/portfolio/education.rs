//! Education entries, listed newest start date first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::{Period, PortfolioRecord, ProfileId, RecordId, RecordKind, newest_period_first, required_input};
use crate::domain::validation::{FieldErrors, required_text};

const NAME_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Education {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub description: String,
    pub period: Period,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EducationDraft {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub description: String,
    pub period: Period,
}

#[derive(Debug, Clone, Default)]
pub struct EducationInput {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<Option<String>>,
    pub current: Option<bool>,
}

impl PortfolioRecord for Education {
    type Draft = EducationDraft;
    type Input = EducationInput;

    const KIND: RecordKind = RecordKind::Education;

    fn id(&self) -> RecordId {
        self.id
    }

    fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    fn draft(&self) -> EducationDraft {
        EducationDraft {
            institution: self.institution.clone(),
            degree: self.degree.clone(),
            field_of_study: self.field_of_study.clone(),
            description: self.description.clone(),
            period: self.period,
        }
    }

    fn to_input(draft: &EducationDraft) -> EducationInput {
        let (start_date, end_date, current) = draft.period.to_input();
        EducationInput {
            institution: Some(draft.institution.clone()),
            degree: Some(draft.degree.clone()),
            field_of_study: Some(draft.field_of_study.clone()),
            description: Some(draft.description.clone()),
            start_date,
            end_date,
            current,
        }
    }

    fn overlay(input: EducationInput, base: EducationInput) -> EducationInput {
        EducationInput {
            institution: input.institution.or(base.institution),
            degree: input.degree.or(base.degree),
            field_of_study: input.field_of_study.or(base.field_of_study),
            description: input.description.or(base.description),
            start_date: input.start_date.or(base.start_date),
            end_date: input.end_date.or(base.end_date),
            current: input.current.or(base.current),
        }
    }

    fn validate(input: EducationInput) -> Result<EducationDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        let institution = required_input(&mut errors, "institution", input.institution.as_deref())
            .and_then(|raw| errors.check("institution", required_text(raw, NAME_MAX)));
        let degree = required_input(&mut errors, "degree", input.degree.as_deref())
            .and_then(|raw| errors.check("degree", required_text(raw, NAME_MAX)));
        let field_of_study =
            required_input(&mut errors, "fieldOfStudy", input.field_of_study.as_deref())
                .and_then(|raw| errors.check("fieldOfStudy", required_text(raw, NAME_MAX)));
        let description = input
            .description
            .map(|raw| raw.trim().to_owned())
            .unwrap_or_default();
        let period = Period::validate(
            &mut errors,
            input.start_date.as_deref(),
            input.end_date.as_ref().map(Option::as_deref),
            input.current,
        );

        match (institution, degree, field_of_study, period) {
            (Some(institution), Some(degree), Some(field_of_study), Some(period)) => {
                Ok(EducationDraft {
                    institution,
                    degree,
                    field_of_study,
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn description_is_optional() {
        let draft = Education::validate(EducationInput {
            institution: Some("University".into()),
            degree: Some("BSc".into()),
            field_of_study: Some("Computer Science".into()),
            description: None,
            start_date: Some("2015-09-01".into()),
            end_date: Some(None),
            current: Some(false),
        })
        .expect("valid education");
        assert_eq!(draft.description, "");
    }

    #[rstest]
    fn field_of_study_is_reported_in_camel_case() {
        let errors = Education::validate(EducationInput {
            institution: Some("University".into()),
            degree: Some("BSc".into()),
            start_date: Some("2015-09-01".into()),
            ..EducationInput::default()
        })
        .expect_err("field of study missing");
        assert!(errors.contains("fieldOfStudy"));
    }
}
