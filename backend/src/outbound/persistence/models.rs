//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    education, experiences, identity_profiles, portfolio_profiles, project_technologies,
    projects, refresh_tokens, skills, users,
};

// ---------------------------------------------------------------------------
// Identity models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

/// Identity row together with its stored password hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
}

/// Partial identity update; `None` leaves a column untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: Option<&'a str>,
    pub email: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = identity_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRow {
    pub title: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub phone: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = identity_profiles)]
pub(crate) struct NewContactRow {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = identity_profiles)]
pub(crate) struct ContactChangeset<'a> {
    pub title: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub location: Option<&'a str>,
    pub website: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = refresh_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RefreshTokenRow {
    pub jti: Uuid,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Portfolio models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = portfolio_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PortfolioProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub avatar: String,
    pub title: String,
    pub bio: String,
    pub location: String,
    pub phone: String,
    pub website: String,
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = portfolio_profiles)]
pub(crate) struct NewPortfolioProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = portfolio_profiles)]
pub(crate) struct ProfileDetailsChangeset<'a> {
    pub avatar: &'a str,
    pub title: &'a str,
    pub bio: &'a str,
    pub location: &'a str,
    pub phone: &'a str,
    pub website: &'a str,
    pub github: &'a str,
    pub linkedin: &'a str,
    pub twitter: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = skills)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SkillRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = skills)]
pub(crate) struct NewSkillRow<'a> {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = skills)]
pub(crate) struct SkillChangeset<'a> {
    pub name: &'a str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub live_url: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub(crate) struct NewProjectRow<'a> {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub image: Option<&'a str>,
    pub live_url: Option<&'a str>,
    pub source_url: Option<&'a str>,
}

/// Full project update; `None` clears a nullable column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProjectChangeset<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub image: Option<&'a str>,
    pub live_url: Option<&'a str>,
    pub source_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_technologies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TechnologyRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_technologies)]
pub(crate) struct NewTechnologyRow<'a> {
    pub id: Uuid,
    pub project_id: Uuid,
    pub position: i32,
    pub name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = experiences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExperienceRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub company: String,
    pub position: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = experiences)]
pub(crate) struct NewExperienceRow<'a> {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub company: &'a str,
    pub position: &'a str,
    pub description: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = experiences)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ExperienceChangeset<'a> {
    pub company: &'a str,
    pub position: &'a str,
    pub description: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = education)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EducationRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = education)]
pub(crate) struct NewEducationRow<'a> {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub institution: &'a str,
    pub degree: &'a str,
    pub field_of_study: &'a str,
    pub description: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = education)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EducationChangeset<'a> {
    pub institution: &'a str,
    pub degree: &'a str,
    pub field_of_study: &'a str,
    pub description: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub updated_at: DateTime<Utc>,
}
