//! Request and response bodies for the portfolio endpoints.
//!
//! Requests deserialise into the domain's all-optional `Input` types so the
//! same body serves create, full replace and partial update. Nullable link
//! and date fields distinguish "absent" from an explicit `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Education, EducationInput, Experience, ExperienceInput, PortfolioOverview, ProfilePatchInput,
    Project, ProjectInput, Skill, SkillInput, Technology, User,
};
use crate::inbound::http::validation::deserialize_some;

/// Skill body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct SkillRequest {
    #[schema(example = "Rust")]
    pub name: Option<String>,
}

impl From<SkillRequest> for SkillInput {
    fn from(value: SkillRequest) -> Self {
        Self { name: value.name }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Skill> for SkillResponse {
    fn from(value: Skill) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// A technology entry: either a bare name or `{"name": ...}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum TechnologyEntry {
    Name(String),
    Named { name: String },
}

impl TechnologyEntry {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Named { name } => name,
        }
    }
}

/// Project body. Supplying `technologies` replaces the whole list.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectRequest {
    #[schema(example = "Portfolio site")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    #[serde(alias = "live_url", deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "https://example.com")]
    pub live_url: Option<Option<String>>,
    #[serde(
        alias = "github_url",
        alias = "sourceUrl",
        deserialize_with = "deserialize_some"
    )]
    #[schema(value_type = Option<String>, example = "https://github.com/ada/site")]
    pub github_url: Option<Option<String>>,
    pub technologies: Option<Vec<TechnologyEntry>>,
}

impl From<ProjectRequest> for ProjectInput {
    fn from(value: ProjectRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            image: value.image,
            live_url: value.live_url,
            source_url: value.github_url,
            technologies: value
                .technologies
                .map(|entries| entries.into_iter().map(TechnologyEntry::into_name).collect()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TechnologyResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub name: String,
}

impl From<Technology> for TechnologyResponse {
    fn from(value: Technology) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<TechnologyResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            description: value.description,
            image: value.image,
            live_url: value.live_url,
            github_url: value.source_url,
            technologies: value
                .technologies
                .into_iter()
                .map(TechnologyResponse::from)
                .collect(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Experience body. Dates use `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceRequest {
    pub company: Option<String>,
    pub position: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "start_date")]
    #[schema(example = "2022-01-01")]
    pub start_date: Option<String>,
    #[serde(alias = "end_date", deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "2023-06-30")]
    pub end_date: Option<Option<String>>,
    pub current: Option<bool>,
}

impl From<ExperienceRequest> for ExperienceInput {
    fn from(value: ExperienceRequest) -> Self {
        Self {
            company: value.company,
            position: value.position,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            current: value.current,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub company: String,
    pub position: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Experience> for ExperienceResponse {
    fn from(value: Experience) -> Self {
        Self {
            id: value.id.to_string(),
            company: value.company,
            position: value.position,
            description: value.description,
            start_date: value.period.start_date,
            end_date: value.period.end_date,
            current: value.period.current,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Education body. Dates use `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationRequest {
    pub institution: Option<String>,
    pub degree: Option<String>,
    #[serde(alias = "field_of_study")]
    pub field_of_study: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "start_date")]
    #[schema(example = "2015-09-01")]
    pub start_date: Option<String>,
    #[serde(alias = "end_date", deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "2018-06-30")]
    pub end_date: Option<Option<String>>,
    pub current: Option<bool>,
}

impl From<EducationRequest> for EducationInput {
    fn from(value: EducationRequest) -> Self {
        Self {
            institution: value.institution,
            degree: value.degree,
            field_of_study: value.field_of_study,
            description: value.description,
            start_date: value.start_date,
            end_date: value.end_date,
            current: value.current,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Education> for EducationResponse {
    fn from(value: Education) -> Self {
        Self {
            id: value.id.to_string(),
            institution: value.institution,
            degree: value.degree,
            field_of_study: value.field_of_study,
            description: value.description,
            start_date: value.period.start_date,
            end_date: value.period.end_date,
            current: value.period.current,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Partial portfolio profile update. Every member is optional.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ProfilePatchRequest {
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

impl From<ProfilePatchRequest> for ProfilePatchInput {
    fn from(value: ProfilePatchRequest) -> Self {
        Self {
            avatar: value.avatar,
            title: value.title,
            bio: value.bio,
            location: value.location,
            phone: value.phone,
            website: value.website,
            github: value.github,
            linkedin: value.linkedin,
            twitter: value.twitter,
        }
    }
}

/// Owner summary nested in a profile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOwnerResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for ProfileOwnerResponse {
    fn from(value: &User) -> Self {
        Self {
            id: value.id().to_string(),
            username: value.username().to_string(),
            email: value.email().to_string(),
            full_name: value.full_name().to_string(),
        }
    }
}

/// A portfolio profile with its four collections.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    pub user: ProfileOwnerResponse,
    pub avatar: String,
    pub title: String,
    pub bio: String,
    pub location: String,
    pub phone: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub skills: Vec<SkillResponse>,
    pub projects: Vec<ProjectResponse>,
    pub experiences: Vec<ExperienceResponse>,
    pub education: Vec<EducationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PortfolioOverview> for ProfileResponse {
    fn from(value: PortfolioOverview) -> Self {
        let PortfolioOverview {
            profile,
            owner,
            skills,
            projects,
            experiences,
            education,
        } = value;
        let details = profile.details;
        Self {
            id: profile.id.to_string(),
            user: ProfileOwnerResponse::from(&owner),
            avatar: details.avatar,
            title: details.title,
            bio: details.bio,
            location: details.location,
            phone: details.phone,
            website: details.website,
            github: details.github,
            linkedin: details.linkedin,
            twitter: details.twitter,
            skills: skills.into_iter().map(SkillResponse::from).collect(),
            projects: projects.into_iter().map(ProjectResponse::from).collect(),
            experiences: experiences
                .into_iter()
                .map(ExperienceResponse::from)
                .collect(),
            education: education.into_iter().map(EducationResponse::from).collect(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}
