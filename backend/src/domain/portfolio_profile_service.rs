//! Portfolio profile service.
//!
//! Reads by id are filtered by ownership, so another user's profile looks
//! missing. Writes by id distinguish the two cases and refuse foreign
//! profiles with a permission error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::portfolio_collection_service::map_portfolio_error;
use crate::domain::ports::{PortfolioProfileCommand, PortfolioProfileRepository};
use crate::domain::{
    Error, PortfolioOverview, PortfolioProfile, PortfolioRecord, ProfileId, ProfilePatch, UserId,
};

const PROFILE_NOT_FOUND: &str = "portfolio profile not found";
const PROFILE_FORBIDDEN: &str = "You do not have permission to modify this profile.";

/// Service implementing [`PortfolioProfileCommand`].
#[derive(Clone)]
pub struct PortfolioProfileService<P> {
    profiles: Arc<P>,
}

impl<P> PortfolioProfileService<P> {
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }
}

fn sort_overview(mut overview: PortfolioOverview) -> PortfolioOverview {
    overview.skills.sort_by(PortfolioRecord::listing_order);
    overview.projects.sort_by(PortfolioRecord::listing_order);
    overview.experiences.sort_by(PortfolioRecord::listing_order);
    overview.education.sort_by(PortfolioRecord::listing_order);
    overview
}

impl<P> PortfolioProfileService<P>
where
    P: PortfolioProfileRepository,
{
    /// The owner's profile row, created when absent.
    async fn ensure_profile(&self, owner: &UserId) -> Result<PortfolioProfile, Error> {
        if let Some(profile) = self
            .profiles
            .find_by_owner(owner)
            .await
            .map_err(map_portfolio_error)?
        {
            return Ok(profile);
        }
        let profile = self
            .profiles
            .create_for_owner(owner)
            .await
            .map_err(map_portfolio_error)?;
        info!(owner = %owner, profile_id = %profile.id, "created missing portfolio profile");
        Ok(profile)
    }

    async fn load_overview(&self, owner: &UserId) -> Result<PortfolioOverview, Error> {
        self.profiles
            .overview(owner)
            .await
            .map_err(map_portfolio_error)?
            .map(sort_overview)
            .ok_or_else(|| Error::not_found(PROFILE_NOT_FOUND))
    }

    async fn apply_patch(
        &self,
        owner: &UserId,
        profile: PortfolioProfile,
        patch: &ProfilePatch,
    ) -> Result<PortfolioOverview, Error> {
        let mut details = profile.details;
        patch.apply(&mut details);
        self.profiles
            .update_details(owner, &details)
            .await
            .map_err(map_portfolio_error)?
            .ok_or_else(|| Error::not_found(PROFILE_NOT_FOUND))?;
        self.load_overview(owner).await
    }
}

#[async_trait]
impl<P> PortfolioProfileCommand for PortfolioProfileService<P>
where
    P: PortfolioProfileRepository,
{
    async fn list(&self, owner: &UserId) -> Result<Vec<PortfolioOverview>, Error> {
        Ok(vec![self.get_mine(owner).await?])
    }

    async fn get_mine(&self, owner: &UserId) -> Result<PortfolioOverview, Error> {
        if let Some(overview) = self
            .profiles
            .overview(owner)
            .await
            .map_err(map_portfolio_error)?
        {
            return Ok(sort_overview(overview));
        }
        self.ensure_profile(owner).await?;
        self.load_overview(owner).await
    }

    async fn get(&self, owner: &UserId, id: &ProfileId) -> Result<PortfolioOverview, Error> {
        let overview = self.get_mine(owner).await?;
        if overview.profile.id == *id {
            Ok(overview)
        } else {
            Err(Error::not_found(PROFILE_NOT_FOUND))
        }
    }

    async fn update_mine(
        &self,
        owner: &UserId,
        patch: ProfilePatch,
    ) -> Result<PortfolioOverview, Error> {
        let profile = self.ensure_profile(owner).await?;
        self.apply_patch(owner, profile, &patch).await
    }

    async fn update(
        &self,
        owner: &UserId,
        id: &ProfileId,
        patch: ProfilePatch,
    ) -> Result<PortfolioOverview, Error> {
        let own = self
            .profiles
            .find_by_owner(owner)
            .await
            .map_err(map_portfolio_error)?;
        if let Some(profile) = own.filter(|profile| profile.id == *id) {
            return self.apply_patch(owner, profile, &patch).await;
        }
        let exists = self
            .profiles
            .profile_exists(id)
            .await
            .map_err(map_portfolio_error)?;
        if exists {
            warn!(owner = %owner, profile_id = %id, "refused update of foreign portfolio profile");
            Err(Error::forbidden(PROFILE_FORBIDDEN))
        } else {
            Err(Error::not_found(PROFILE_NOT_FOUND))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::ports::MockPortfolioProfileRepository;
    use crate::domain::{
        EmailAddress, ErrorCode, FullName, ProfileDetails, ProfilePatchInput, User, Username,
    };

    fn profile(owner: UserId) -> PortfolioProfile {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 5, 12, 0, 0)
            .single()
            .expect("timestamp");
        PortfolioProfile {
            id: ProfileId::random(),
            owner,
            details: ProfileDetails {
                title: "Engineer".to_owned(),
                bio: "Builds things".to_owned(),
                ..ProfileDetails::default()
            },
            created_at: at,
            updated_at: at,
        }
    }

    fn overview(profile: PortfolioProfile) -> PortfolioOverview {
        let owner = User::new(
            profile.owner,
            Username::new("alice").expect("username"),
            EmailAddress::new("a@x.com").expect("email"),
            FullName::new("").expect("full name"),
            profile.created_at,
        );
        PortfolioOverview {
            profile,
            owner,
            skills: Vec::new(),
            projects: Vec::new(),
            experiences: Vec::new(),
            education: Vec::new(),
        }
    }

    fn patch(title: &str) -> ProfilePatch {
        ProfilePatch::try_new(ProfilePatchInput {
            title: Some(title.to_owned()),
            ..ProfilePatchInput::default()
        })
        .expect("valid patch")
    }

    #[tokio::test]
    async fn get_mine_creates_profile_on_first_access() {
        let owner = UserId::random();
        let created = profile(owner);
        let loaded = overview(created.clone());
        let mut repo = MockPortfolioProfileRepository::new();
        let mut calls = 0;
        repo.expect_overview().times(2).returning(move |_| {
            calls += 1;
            Ok((calls > 1).then(|| loaded.clone()))
        });
        repo.expect_find_by_owner().times(1).return_once(|_| Ok(None));
        repo.expect_create_for_owner()
            .times(1)
            .return_once(move |_| Ok(created));

        let service = PortfolioProfileService::new(Arc::new(repo));
        let found = service.get_mine(&owner).await.expect("profile");

        assert_eq!(found.profile.owner, owner);
    }

    #[tokio::test]
    async fn get_by_foreign_id_is_not_found() {
        let owner = UserId::random();
        let own = overview(profile(owner));
        let mut repo = MockPortfolioProfileRepository::new();
        repo.expect_overview().return_once(move |_| Ok(Some(own)));

        let service = PortfolioProfileService::new(Arc::new(repo));
        let error = service
            .get(&owner, &ProfileId::random())
            .await
            .expect_err("foreign id hidden");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_by_foreign_id_is_forbidden() {
        let owner = UserId::random();
        let own = profile(owner);
        let mut repo = MockPortfolioProfileRepository::new();
        repo.expect_find_by_owner()
            .return_once(move |_| Ok(Some(own)));
        repo.expect_profile_exists().return_once(|_| Ok(true));
        repo.expect_update_details().never();

        let service = PortfolioProfileService::new(Arc::new(repo));
        let error = service
            .update(&owner, &ProfileId::random(), patch("Hacker"))
            .await
            .expect_err("foreign profile refused");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_by_unknown_id_is_not_found() {
        let owner = UserId::random();
        let own = profile(owner);
        let mut repo = MockPortfolioProfileRepository::new();
        repo.expect_find_by_owner()
            .return_once(move |_| Ok(Some(own)));
        repo.expect_profile_exists().return_once(|_| Ok(false));

        let service = PortfolioProfileService::new(Arc::new(repo));
        let error = service
            .update(&owner, &ProfileId::random(), patch("Nobody"))
            .await
            .expect_err("unknown profile");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let owner = UserId::random();
        let own = profile(owner);
        let id = own.id;
        let mut expected = own.clone();
        expected.details.title = "Architect".to_owned();
        let reloaded = overview(expected.clone());
        let mut repo = MockPortfolioProfileRepository::new();
        repo.expect_find_by_owner()
            .return_once(move |_| Ok(Some(own)));
        repo.expect_update_details()
            .withf(|_, details| details.title == "Architect" && details.bio == "Builds things")
            .times(1)
            .return_once(move |_, _| Ok(Some(expected)));
        repo.expect_overview()
            .return_once(move |_| Ok(Some(reloaded)));

        let service = PortfolioProfileService::new(Arc::new(repo));
        let updated = service
            .update(&owner, &id, patch("Architect"))
            .await
            .expect("update succeeds");

        assert_eq!(updated.profile.details.title, "Architect");
        assert_eq!(updated.profile.details.bio, "Builds things");
    }
}
