//! PostgreSQL-backed `PortfolioProfileRepository` implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PortfolioPersistenceError, PortfolioProfileRepository};
use crate::domain::{
    Education, Experience, PortfolioOverview, PortfolioProfile, ProfileDetails, ProfileId, Skill,
    UserId,
};

use super::diesel_account_repository::row_to_user;
use super::diesel_portfolio_records::{
    assemble_projects, load_technologies, map_diesel_error, map_pool_error,
};
use super::models::{
    EducationRow, ExperienceRow, NewPortfolioProfileRow, PortfolioProfileRow,
    ProfileDetailsChangeset, ProjectRow, SkillRow, UserRow,
};
use super::pool::DbPool;
use super::schema::{education, experiences, portfolio_profiles, projects, skills, users};

/// Diesel-backed implementation of the [`PortfolioProfileRepository`] port.
#[derive(Clone)]
pub struct DieselPortfolioProfileRepository {
    pool: DbPool,
}

impl DieselPortfolioProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<PortfolioProfileRow> for PortfolioProfile {
    fn from(row: PortfolioProfileRow) -> Self {
        Self {
            id: ProfileId::from(row.id),
            owner: UserId::from(row.user_id),
            details: ProfileDetails {
                avatar: row.avatar,
                title: row.title,
                bio: row.bio,
                location: row.location,
                phone: row.phone,
                website: row.website,
                github: row.github,
                linkedin: row.linkedin,
                twitter: row.twitter,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn details_changeset(details: &ProfileDetails) -> ProfileDetailsChangeset<'_> {
    ProfileDetailsChangeset {
        avatar: &details.avatar,
        title: &details.title,
        bio: &details.bio,
        location: &details.location,
        phone: &details.phone,
        website: &details.website,
        github: &details.github,
        linkedin: &details.linkedin,
        twitter: &details.twitter,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl PortfolioProfileRepository for DieselPortfolioProfileRepository {
    async fn overview(
        &self,
        owner: &UserId,
    ) -> Result<Option<PortfolioOverview>, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found: Option<(PortfolioProfileRow, UserRow)> = portfolio_profiles::table
            .inner_join(users::table)
            .filter(portfolio_profiles::user_id.eq(owner.as_uuid()))
            .select((PortfolioProfileRow::as_select(), UserRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some((profile_row, user_row)) = found else {
            return Ok(None);
        };
        let profile_id = profile_row.id;

        let skill_rows: Vec<SkillRow> = skills::table
            .filter(skills::profile_id.eq(profile_id))
            .select(SkillRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let project_rows: Vec<ProjectRow> = projects::table
            .filter(projects::profile_id.eq(profile_id))
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let project_ids: Vec<_> = project_rows.iter().map(|row| row.id).collect();
        let technologies = load_technologies(&mut conn, &project_ids)
            .await
            .map_err(map_diesel_error)?;
        let experience_rows: Vec<ExperienceRow> = experiences::table
            .filter(experiences::profile_id.eq(profile_id))
            .select(ExperienceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let education_rows: Vec<EducationRow> = education::table
            .filter(education::profile_id.eq(profile_id))
            .select(EducationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let owner = row_to_user(user_row)
            .map_err(|err| PortfolioPersistenceError::query(err.to_string()))?;
        Ok(Some(PortfolioOverview {
            profile: PortfolioProfile::from(profile_row),
            owner,
            skills: skill_rows.into_iter().map(Skill::from).collect(),
            projects: assemble_projects(project_rows, technologies),
            experiences: experience_rows.into_iter().map(Experience::from).collect(),
            education: education_rows.into_iter().map(Education::from).collect(),
        }))
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<PortfolioProfile>, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PortfolioProfileRow> = portfolio_profiles::table
            .filter(portfolio_profiles::user_id.eq(owner.as_uuid()))
            .select(PortfolioProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(PortfolioProfile::from))
    }

    async fn create_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<PortfolioProfile, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(portfolio_profiles::table)
            .values(&NewPortfolioProfileRow {
                id: *ProfileId::random().as_uuid(),
                user_id: *owner.as_uuid(),
            })
            .on_conflict(portfolio_profiles::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let row: PortfolioProfileRow = portfolio_profiles::table
            .filter(portfolio_profiles::user_id.eq(owner.as_uuid()))
            .select(PortfolioProfileRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(PortfolioProfile::from(row))
    }

    async fn profile_exists(&self, id: &ProfileId) -> Result<bool, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            portfolio_profiles::table.filter(portfolio_profiles::id.eq(id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn update_details(
        &self,
        owner: &UserId,
        details: &ProfileDetails,
    ) -> Result<Option<PortfolioProfile>, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PortfolioProfileRow> = diesel::update(
            portfolio_profiles::table.filter(portfolio_profiles::user_id.eq(owner.as_uuid())),
        )
        .set(details_changeset(details))
        .returning(PortfolioProfileRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        Ok(row.map(PortfolioProfile::from))
    }
}
