//! PostgreSQL-backed portfolio collections.
//!
//! Every read and write filters on `profile_id IN (SELECT id FROM
//! portfolio_profiles WHERE user_id = $owner)`, so a record owned by another
//! user behaves exactly like a missing one.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PortfolioPersistenceError, PortfolioRecordRepository};
use crate::domain::{
    Education, EducationDraft, Experience, ExperienceDraft, Period, ProfileId, Project,
    ProjectDraft, RecordId, Skill, SkillDraft, Technology, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    EducationChangeset, EducationRow, ExperienceChangeset, ExperienceRow, NewEducationRow,
    NewExperienceRow, NewProjectRow, NewSkillRow, NewTechnologyRow, ProjectChangeset, ProjectRow,
    SkillChangeset, SkillRow, TechnologyRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{education, experiences, portfolio_profiles, project_technologies, projects, skills};

/// Diesel-backed implementation of [`PortfolioRecordRepository`] for all
/// four record kinds.
#[derive(Clone)]
pub struct DieselPortfolioRecordRepository {
    pool: DbPool,
}

impl DieselPortfolioRecordRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

pub(super) fn map_pool_error(error: PoolError) -> PortfolioPersistenceError {
    map_basic_pool_error(error, PortfolioPersistenceError::connection)
}

pub(super) fn map_diesel_error(error: diesel::result::Error) -> PortfolioPersistenceError {
    map_basic_diesel_error(
        error,
        PortfolioPersistenceError::query,
        PortfolioPersistenceError::connection,
    )
}

type OwnedProfileIds = dsl::Select<
    dsl::Filter<portfolio_profiles::table, dsl::Eq<portfolio_profiles::user_id, Uuid>>,
    portfolio_profiles::id,
>;

/// Subquery selecting the id of the profile `owner` owns.
fn owned_profile_ids(owner: &UserId) -> OwnedProfileIds {
    portfolio_profiles::table
        .filter(portfolio_profiles::user_id.eq(*owner.as_uuid()))
        .select(portfolio_profiles::id)
}

async fn owned_profile_id<C>(conn: &mut C, owner: &UserId) -> QueryResult<Option<Uuid>>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    owned_profile_ids(owner).first(conn).await.optional()
}

// ---------------------------------------------------------------------------
// Row conversions
// ---------------------------------------------------------------------------

fn period(start_date: chrono::NaiveDate, end_date: Option<chrono::NaiveDate>, current: bool) -> Period {
    Period {
        start_date,
        end_date,
        current,
    }
}

impl From<SkillRow> for Skill {
    fn from(row: SkillRow) -> Self {
        Self {
            id: RecordId::from(row.id),
            profile_id: ProfileId::from(row.profile_id),
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<ExperienceRow> for Experience {
    fn from(row: ExperienceRow) -> Self {
        Self {
            id: RecordId::from(row.id),
            profile_id: ProfileId::from(row.profile_id),
            company: row.company,
            position: row.position,
            description: row.description,
            period: period(row.start_date, row.end_date, row.is_current),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<EducationRow> for Education {
    fn from(row: EducationRow) -> Self {
        Self {
            id: RecordId::from(row.id),
            profile_id: ProfileId::from(row.profile_id),
            institution: row.institution,
            degree: row.degree,
            field_of_study: row.field_of_study,
            description: row.description,
            period: period(row.start_date, row.end_date, row.is_current),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Attach technologies (already ordered by position) to their projects.
pub(super) fn assemble_projects(rows: Vec<ProjectRow>, technologies: Vec<TechnologyRow>) -> Vec<Project> {
    let mut by_project: HashMap<Uuid, Vec<Technology>> = HashMap::new();
    for tech in technologies {
        by_project.entry(tech.project_id).or_default().push(Technology {
            id: RecordId::from(tech.id),
            name: tech.name,
        });
    }
    rows.into_iter()
        .map(|row| Project {
            technologies: by_project.remove(&row.id).unwrap_or_default(),
            id: RecordId::from(row.id),
            profile_id: ProfileId::from(row.profile_id),
            title: row.title,
            description: row.description,
            image: row.image,
            live_url: row.live_url,
            source_url: row.source_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}

pub(super) async fn load_technologies<C>(conn: &mut C, project_ids: &[Uuid]) -> QueryResult<Vec<TechnologyRow>>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    project_technologies::table
        .filter(project_technologies::project_id.eq_any(project_ids))
        .order((project_technologies::project_id, project_technologies::position))
        .select(TechnologyRow::as_select())
        .load(conn)
        .await
}

async fn with_technologies<C>(conn: &mut C, rows: Vec<ProjectRow>) -> QueryResult<Vec<Project>>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let technologies = load_technologies(conn, &ids).await?;
    Ok(assemble_projects(rows, technologies))
}

async fn write_technologies<C>(conn: &mut C, project_id: Uuid, names: &[String]) -> QueryResult<()>
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    let rows: Vec<NewTechnologyRow<'_>> = names
        .iter()
        .zip(0_i32..)
        .map(|(name, position)| NewTechnologyRow {
            id: *RecordId::random().as_uuid(),
            project_id,
            position,
            name: name.as_str(),
        })
        .collect();
    if !rows.is_empty() {
        diesel::insert_into(project_technologies::table)
            .values(&rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Draft to row builders
// ---------------------------------------------------------------------------

fn new_skill(id: Uuid, profile_id: Uuid, draft: &SkillDraft) -> NewSkillRow<'_> {
    NewSkillRow {
        id,
        profile_id,
        name: &draft.name,
    }
}

fn skill_changes(draft: &SkillDraft, now: DateTime<Utc>) -> SkillChangeset<'_> {
    SkillChangeset {
        name: &draft.name,
        updated_at: now,
    }
}

fn new_experience(id: Uuid, profile_id: Uuid, draft: &ExperienceDraft) -> NewExperienceRow<'_> {
    NewExperienceRow {
        id,
        profile_id,
        company: &draft.company,
        position: &draft.position,
        description: &draft.description,
        start_date: draft.period.start_date,
        end_date: draft.period.end_date,
        is_current: draft.period.current,
    }
}

fn experience_changes(draft: &ExperienceDraft, now: DateTime<Utc>) -> ExperienceChangeset<'_> {
    ExperienceChangeset {
        company: &draft.company,
        position: &draft.position,
        description: &draft.description,
        start_date: draft.period.start_date,
        end_date: draft.period.end_date,
        is_current: draft.period.current,
        updated_at: now,
    }
}

fn new_education(id: Uuid, profile_id: Uuid, draft: &EducationDraft) -> NewEducationRow<'_> {
    NewEducationRow {
        id,
        profile_id,
        institution: &draft.institution,
        degree: &draft.degree,
        field_of_study: &draft.field_of_study,
        description: &draft.description,
        start_date: draft.period.start_date,
        end_date: draft.period.end_date,
        is_current: draft.period.current,
    }
}

fn education_changes(draft: &EducationDraft, now: DateTime<Utc>) -> EducationChangeset<'_> {
    EducationChangeset {
        institution: &draft.institution,
        degree: &draft.degree,
        field_of_study: &draft.field_of_study,
        description: &draft.description,
        start_date: draft.period.start_date,
        end_date: draft.period.end_date,
        is_current: draft.period.current,
        updated_at: now,
    }
}

fn new_project(id: Uuid, profile_id: Uuid, draft: &ProjectDraft) -> NewProjectRow<'_> {
    NewProjectRow {
        id,
        profile_id,
        title: &draft.title,
        description: &draft.description,
        image: draft.image.as_deref(),
        live_url: draft.live_url.as_deref(),
        source_url: draft.source_url.as_deref(),
    }
}

fn project_changes(draft: &ProjectDraft, now: DateTime<Utc>) -> ProjectChangeset<'_> {
    ProjectChangeset {
        title: &draft.title,
        description: &draft.description,
        image: draft.image.as_deref(),
        live_url: draft.live_url.as_deref(),
        source_url: draft.source_url.as_deref(),
        updated_at: now,
    }
}

// ---------------------------------------------------------------------------
// Flat collections
// ---------------------------------------------------------------------------

/// Generate the [`PortfolioRecordRepository`] impl for a collection stored
/// in a single table.
///
/// The table needs `id` and `profile_id` columns; the row type must convert
/// into the record with `From`.
macro_rules! impl_record_repository {
    (
        $record:ty {
            table: $table:ident,
            row: $row:ty,
            new_row: $new_row:path,
            changeset: $changeset:path $(,)?
        }
    ) => {
        #[async_trait]
        impl PortfolioRecordRepository<$record> for DieselPortfolioRecordRepository {
            async fn list(&self, owner: &UserId) -> Result<Vec<$record>, PortfolioPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let rows: Vec<$row> = $table::table
                    .filter($table::profile_id.eq_any(owned_profile_ids(owner)))
                    .select(<$row>::as_select())
                    .load(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                Ok(rows.into_iter().map(<$record>::from).collect())
            }

            async fn find(
                &self,
                owner: &UserId,
                id: &RecordId,
            ) -> Result<Option<$record>, PortfolioPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row: Option<$row> = $table::table
                    .filter($table::id.eq(id.as_uuid()))
                    .filter($table::profile_id.eq_any(owned_profile_ids(owner)))
                    .select(<$row>::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(map_diesel_error)?;
                Ok(row.map(<$record>::from))
            }

            async fn insert(
                &self,
                owner: &UserId,
                draft: &<$record as crate::domain::PortfolioRecord>::Draft,
            ) -> Result<$record, PortfolioPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let profile_id = owned_profile_id(&mut conn, owner)
                    .await
                    .map_err(map_diesel_error)?
                    .ok_or(PortfolioPersistenceError::ProfileMissing)?;
                let row: $row = diesel::insert_into($table::table)
                    .values($new_row(*RecordId::random().as_uuid(), profile_id, draft))
                    .returning(<$row>::as_returning())
                    .get_result(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                Ok(<$record>::from(row))
            }

            async fn update(
                &self,
                owner: &UserId,
                id: &RecordId,
                draft: &<$record as crate::domain::PortfolioRecord>::Draft,
            ) -> Result<Option<$record>, PortfolioPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let row: Option<$row> = diesel::update(
                    $table::table
                        .filter($table::id.eq(id.as_uuid()))
                        .filter($table::profile_id.eq_any(owned_profile_ids(owner))),
                )
                .set($changeset(draft, Utc::now()))
                .returning(<$row>::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
                Ok(row.map(<$record>::from))
            }

            async fn delete(
                &self,
                owner: &UserId,
                id: &RecordId,
            ) -> Result<bool, PortfolioPersistenceError> {
                let mut conn = self.pool.get().await.map_err(map_pool_error)?;
                let deleted = diesel::delete(
                    $table::table
                        .filter($table::id.eq(id.as_uuid()))
                        .filter($table::profile_id.eq_any(owned_profile_ids(owner))),
                )
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
                Ok(deleted > 0)
            }
        }
    };
}

impl_record_repository!(Skill {
    table: skills,
    row: SkillRow,
    new_row: new_skill,
    changeset: skill_changes,
});

impl_record_repository!(Experience {
    table: experiences,
    row: ExperienceRow,
    new_row: new_experience,
    changeset: experience_changes,
});

impl_record_repository!(Education {
    table: education,
    row: EducationRow,
    new_row: new_education,
    changeset: education_changes,
});

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Projects also own an ordered technology list, so writes run in a
/// transaction and an update replaces the whole list.
#[async_trait]
impl PortfolioRecordRepository<Project> for DieselPortfolioRecordRepository {
    async fn list(&self, owner: &UserId) -> Result<Vec<Project>, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::profile_id.eq_any(owned_profile_ids(owner)))
            .select(ProjectRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        with_technologies(&mut conn, rows)
            .await
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        owner: &UserId,
        id: &RecordId,
    ) -> Result<Option<Project>, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProjectRow> = projects::table
            .filter(projects::id.eq(id.as_uuid()))
            .filter(projects::profile_id.eq_any(owned_profile_ids(owner)))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let projects = with_technologies(&mut conn, vec![row])
            .await
            .map_err(map_diesel_error)?;
        Ok(projects.into_iter().next())
    }

    async fn insert(
        &self,
        owner: &UserId,
        draft: &ProjectDraft,
    ) -> Result<Project, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owner = *owner;
        let inserted = conn
            .transaction(|conn| {
                async move {
                    let Some(profile_id) = owned_profile_id(conn, &owner).await? else {
                        return Ok(None);
                    };
                    let row: ProjectRow = diesel::insert_into(projects::table)
                        .values(new_project(*RecordId::random().as_uuid(), profile_id, draft))
                        .returning(ProjectRow::as_returning())
                        .get_result(conn)
                        .await?;
                    write_technologies(conn, row.id, &draft.technologies).await?;
                    with_technologies(conn, vec![row]).await.map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        inserted
            .and_then(|projects| projects.into_iter().next())
            .ok_or(PortfolioPersistenceError::ProfileMissing)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &RecordId,
        draft: &ProjectDraft,
    ) -> Result<Option<Project>, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (owner, id) = (*owner, *id.as_uuid());
        let updated = conn
            .transaction(|conn| {
                async move {
                    let row: Option<ProjectRow> = diesel::update(
                        projects::table
                            .filter(projects::id.eq(id))
                            .filter(projects::profile_id.eq_any(owned_profile_ids(&owner))),
                    )
                    .set(project_changes(draft, Utc::now()))
                    .returning(ProjectRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    let Some(row) = row else {
                        return Ok(None);
                    };
                    diesel::delete(
                        project_technologies::table.filter(project_technologies::project_id.eq(id)),
                    )
                    .execute(conn)
                    .await?;
                    write_technologies(conn, id, &draft.technologies).await?;
                    with_technologies(conn, vec![row]).await.map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(updated.and_then(|projects| projects.into_iter().next()))
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<bool, PortfolioPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            projects::table
                .filter(projects::id.eq(id.as_uuid()))
                .filter(projects::profile_id.eq_any(owned_profile_ids(owner))),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn project_row(id: Uuid, title: &str) -> ProjectRow {
        let now = Utc::now();
        ProjectRow {
            id,
            profile_id: Uuid::nil(),
            title: title.to_owned(),
            description: "desc".to_owned(),
            image: None,
            live_url: None,
            source_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn tech(project_id: Uuid, name: &str) -> TechnologyRow {
        TechnologyRow {
            id: Uuid::new_v4(),
            project_id,
            name: name.to_owned(),
        }
    }

    #[rstest]
    fn technologies_attach_to_their_project_in_order() {
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let projects = assemble_projects(
            vec![project_row(first, "one"), project_row(second, "two")],
            vec![tech(first, "Rust"), tech(second, "Go"), tech(first, "SQL")],
        );
        let names = |project: &Project| {
            project
                .technologies
                .iter()
                .map(|t| t.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&projects[0]), ["Rust", "SQL"]);
        assert_eq!(names(&projects[1]), ["Go"]);
    }

    #[rstest]
    fn projects_without_technologies_get_an_empty_list() {
        let projects = assemble_projects(vec![project_row(Uuid::new_v4(), "solo")], Vec::new());
        assert!(projects[0].technologies.is_empty());
    }

    #[rstest]
    fn experience_rows_carry_their_period() {
        let now = Utc::now();
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).expect("valid date");
        let experience = Experience::from(ExperienceRow {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            company: "Acme".to_owned(),
            position: "Engineer".to_owned(),
            description: "Built things".to_owned(),
            start_date: start,
            end_date: None,
            is_current: true,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(
            experience.period,
            Period {
                start_date: start,
                end_date: None,
                current: true,
            }
        );
    }

    #[rstest]
    fn project_changes_clear_absent_links() {
        let draft = ProjectDraft {
            title: "Site".to_owned(),
            description: "Portfolio".to_owned(),
            image: None,
            live_url: None,
            source_url: Some("https://example.com/src".to_owned()),
            technologies: vec!["Rust".to_owned()],
        };
        let changes = project_changes(&draft, Utc::now());
        assert_eq!(changes.live_url, None);
        assert_eq!(changes.source_url, Some("https://example.com/src"));
    }
}
