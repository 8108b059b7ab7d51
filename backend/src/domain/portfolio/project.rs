//! Project records with their nested technology list.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::{PortfolioRecord, ProfileId, RecordId, RecordKind, required_input};
use crate::domain::validation::{FieldErrors, nullable_url, required_body, required_text};

const TITLE_MAX: usize = 200;
const TECHNOLOGY_MAX: usize = 50;

/// A technology used by a project, e.g. "Rust".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technology {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: RecordId,
    pub profile_id: ProfileId,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub live_url: Option<String>,
    pub source_url: Option<String>,
    pub technologies: Vec<Technology>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated project fields. `technologies` keeps client order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub live_url: Option<String>,
    pub source_url: Option<String>,
    pub technologies: Vec<String>,
}

/// Raw project payload. Nullable members use `Some(None)` for an explicit
/// `null`.
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
    pub live_url: Option<Option<String>>,
    pub source_url: Option<Option<String>>,
    pub technologies: Option<Vec<String>>,
}

impl PortfolioRecord for Project {
    type Draft = ProjectDraft;
    type Input = ProjectInput;

    const KIND: RecordKind = RecordKind::Project;

    fn id(&self) -> RecordId {
        self.id
    }

    fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    fn draft(&self) -> ProjectDraft {
        ProjectDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            image: self.image.clone(),
            live_url: self.live_url.clone(),
            source_url: self.source_url.clone(),
            technologies: self.technologies.iter().map(|t| t.name.clone()).collect(),
        }
    }

    fn to_input(draft: &ProjectDraft) -> ProjectInput {
        ProjectInput {
            title: Some(draft.title.clone()),
            description: Some(draft.description.clone()),
            image: Some(draft.image.clone()),
            live_url: Some(draft.live_url.clone()),
            source_url: Some(draft.source_url.clone()),
            technologies: Some(draft.technologies.clone()),
        }
    }

    fn overlay(input: ProjectInput, base: ProjectInput) -> ProjectInput {
        ProjectInput {
            title: input.title.or(base.title),
            description: input.description.or(base.description),
            image: input.image.or(base.image),
            live_url: input.live_url.or(base.live_url),
            source_url: input.source_url.or(base.source_url),
            technologies: input.technologies.or(base.technologies),
        }
    }

    fn validate(input: ProjectInput) -> Result<ProjectDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        let title = required_input(&mut errors, "title", input.title.as_deref())
            .and_then(|raw| errors.check("title", required_text(raw, TITLE_MAX)));
        let description = required_input(&mut errors, "description", input.description.as_deref())
            .and_then(|raw| errors.check("description", required_body(raw)));
        let image = input
            .image
            .flatten()
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty());
        let live_url = errors.check("liveUrl", nullable_url(input.live_url.flatten().as_deref()));
        let source_url = errors.check(
            "githubUrl",
            nullable_url(input.source_url.flatten().as_deref()),
        );
        let technologies = validate_technologies(&mut errors, input.technologies.unwrap_or_default());

        match (title, description, live_url, source_url) {
            (Some(title), Some(description), Some(live_url), Some(source_url))
                if errors.is_empty() =>
            {
                Ok(ProjectDraft {
                    title,
                    description,
                    image,
                    live_url,
                    source_url,
                    technologies,
                })
            }
            _ => Err(errors),
        }
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| self.title.cmp(&other.title))
    }
}

fn validate_technologies(errors: &mut FieldErrors, raw: Vec<String>) -> Vec<String> {
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        match required_text(&name, TECHNOLOGY_MAX) {
            Ok(valid) => names.push(valid),
            Err(err) => errors.add("technologies", format!("{}: {err}", name.trim())),
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn full_input() -> ProjectInput {
        ProjectInput {
            title: Some("Portfolio".into()),
            description: Some("Personal site".into()),
            image: Some(Some("projects/portfolio.png".into())),
            live_url: Some(Some("https://example.com".into())),
            source_url: Some(None),
            technologies: Some(vec!["Rust".into(), " Postgres ".into()]),
        }
    }

    #[rstest]
    fn valid_input_trims_technologies(full_input: ProjectInput) {
        let draft = Project::validate(full_input).expect("valid project");
        assert_eq!(draft.technologies, ["Rust", "Postgres"]);
        assert_eq!(draft.source_url, None);
        assert_eq!(draft.image.as_deref(), Some("projects/portfolio.png"));
    }

    #[rstest]
    fn missing_required_fields_are_reported() {
        let errors = Project::validate(ProjectInput::default()).expect_err("empty payload");
        assert!(errors.contains("title"));
        assert!(errors.contains("description"));
    }

    #[rstest]
    fn invalid_urls_and_technologies_are_reported(mut full_input: ProjectInput) {
        full_input.live_url = Some(Some("not a url".into()));
        full_input.technologies = Some(vec![String::new()]);
        let errors = Project::validate(full_input).expect_err("invalid payload");
        assert!(errors.contains("liveUrl"));
        assert!(errors.contains("technologies"));
    }

    #[rstest]
    fn repository_link_errors_use_the_wire_field_name(mut full_input: ProjectInput) {
        full_input.source_url = Some(Some("github.com/a/b".into()));
        let errors = Project::validate(full_input).expect_err("invalid link");
        assert!(errors.contains("githubUrl"));
        assert!(!errors.contains("sourceUrl"));
    }

    #[rstest]
    fn overlay_keeps_technologies_unless_supplied(full_input: ProjectInput) {
        let base = Project::to_input(&Project::validate(full_input).expect("valid"));
        let patch = ProjectInput {
            title: Some("Renamed".into()),
            ..ProjectInput::default()
        };
        let draft = Project::validate(Project::overlay(patch, base)).expect("valid");
        assert_eq!(draft.title, "Renamed");
        assert_eq!(draft.technologies, ["Rust", "Postgres"]);
    }

    #[rstest]
    fn explicit_null_clears_nullable_fields(full_input: ProjectInput) {
        let base = Project::to_input(&Project::validate(full_input).expect("valid"));
        let patch = ProjectInput {
            live_url: Some(None),
            ..ProjectInput::default()
        };
        let draft = Project::validate(Project::overlay(patch, base)).expect("valid");
        assert_eq!(draft.live_url, None);
    }
}
