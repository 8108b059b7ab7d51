//! In-memory implementation of every repository port.
//!
//! One [`InMemoryStore`] stands in for the whole database so deleting an
//! account cascades to its tokens, profile and records the way the schema's
//! foreign keys do.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountPersistenceError, AccountRepository, NewAccount, PortfolioPersistenceError,
    PortfolioProfileRepository, PortfolioRecordRepository, RefreshTokenPersistenceError,
    RefreshTokenRepository, StoredCredentials,
};
use crate::domain::{
    Account, AccountPatch, ContactDetails, EmailAddress, Education, EducationDraft, Experience,
    ExperienceDraft, PasswordHash, PortfolioOverview, PortfolioProfile, ProfileDetails, ProfileId,
    Project, ProjectDraft, RecordId, RefreshTokenId, RefreshTokenRecord, ResetTokenDigest, Skill,
    SkillDraft, Technology, User, UserId, Username,
};

struct StoredAccount {
    account: Account,
    password_hash: PasswordHash,
    reset: Option<(ResetTokenDigest, DateTime<Utc>)>,
}

impl StoredAccount {
    fn credentials(&self) -> StoredCredentials {
        StoredCredentials {
            user: self.account.user.clone(),
            password_hash: self.password_hash.clone(),
        }
    }
}

#[derive(Default)]
struct State {
    accounts: Vec<StoredAccount>,
    refresh_tokens: Vec<RefreshTokenRecord>,
    profiles: Vec<PortfolioProfile>,
    skills: Vec<Skill>,
    projects: Vec<Project>,
    experiences: Vec<Experience>,
    education: Vec<Education>,
}

impl State {
    fn account(&self, id: &UserId) -> Option<&StoredAccount> {
        self.accounts.iter().find(|stored| stored.account.user.id() == id)
    }

    fn account_mut(&mut self, id: &UserId) -> Option<&mut StoredAccount> {
        self.accounts
            .iter_mut()
            .find(|stored| stored.account.user.id() == id)
    }

    fn profile_id(&self, owner: &UserId) -> Option<ProfileId> {
        self.profiles
            .iter()
            .find(|profile| profile.owner == *owner)
            .map(|profile| profile.id)
    }

    fn new_profile(owner: &UserId) -> PortfolioProfile {
        let now = Utc::now();
        PortfolioProfile {
            id: ProfileId::random(),
            owner: *owner,
            details: ProfileDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Shared in-memory database.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of refresh tokens recorded for `user`, revoked or not.
    pub fn refresh_token_count(&self, user: &UserId) -> usize {
        self.state()
            .refresh_tokens
            .iter()
            .filter(|token| token.user_id == *user)
            .count()
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn create(&self, account: &NewAccount) -> Result<Account, AccountPersistenceError> {
        let mut state = self.state();
        if state
            .accounts
            .iter()
            .any(|stored| *stored.account.user.username() == account.username)
        {
            return Err(AccountPersistenceError::DuplicateUsername);
        }
        if state
            .accounts
            .iter()
            .any(|stored| *stored.account.user.email() == account.email)
        {
            return Err(AccountPersistenceError::DuplicateEmail);
        }

        let created = Account {
            user: User::new(
                account.id,
                account.username.clone(),
                account.email.clone(),
                account.full_name.clone(),
                Utc::now(),
            ),
            contact: ContactDetails::default(),
        };
        state.accounts.push(StoredAccount {
            account: created.clone(),
            password_hash: account.password_hash.clone(),
            reset: None,
        });
        state.profiles.push(State::new_profile(&account.id));
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountPersistenceError> {
        Ok(self.state().account(id).map(|stored| stored.account.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountPersistenceError> {
        Ok(self
            .state()
            .accounts
            .iter()
            .find(|stored| stored.account.user.email() == email)
            .map(|stored| stored.account.user.clone()))
    }

    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError> {
        Ok(self
            .state()
            .accounts
            .iter()
            .find(|stored| stored.account.user.username().as_str() == username)
            .map(StoredAccount::credentials))
    }

    async fn credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError> {
        Ok(self.state().account(id).map(StoredAccount::credentials))
    }

    async fn username_taken(
        &self,
        username: &Username,
        except: Option<UserId>,
    ) -> Result<bool, AccountPersistenceError> {
        Ok(self.state().accounts.iter().any(|stored| {
            stored.account.user.username() == username
                && Some(*stored.account.user.id()) != except
        }))
    }

    async fn email_taken(
        &self,
        email: &EmailAddress,
        except: Option<UserId>,
    ) -> Result<bool, AccountPersistenceError> {
        Ok(self.state().accounts.iter().any(|stored| {
            stored.account.user.email() == email && Some(*stored.account.user.id()) != except
        }))
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, AccountPersistenceError> {
        let mut state = self.state();
        let Some(stored) = state.account_mut(id) else {
            return Ok(None);
        };
        let user = &stored.account.user;
        stored.account.user = User::new(
            *user.id(),
            patch.username.clone().unwrap_or_else(|| user.username().clone()),
            patch.email.clone().unwrap_or_else(|| user.email().clone()),
            patch
                .full_name
                .clone()
                .unwrap_or_else(|| user.full_name().clone()),
            user.joined_at(),
        );
        patch.apply_contact(&mut stored.account.contact);
        Ok(Some(stored.account.clone()))
    }

    async fn set_password(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, AccountPersistenceError> {
        let mut state = self.state();
        Ok(state
            .account_mut(id)
            .map(|stored| stored.password_hash = hash.clone())
            .is_some())
    }

    async fn store_reset_token(
        &self,
        id: &UserId,
        digest: &ResetTokenDigest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountPersistenceError> {
        if let Some(stored) = self.state().account_mut(id) {
            stored.reset = Some((digest.clone(), expires_at));
        }
        Ok(())
    }

    async fn credentials_by_reset_token(
        &self,
        digest: &ResetTokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError> {
        Ok(self
            .state()
            .accounts
            .iter()
            .find(|stored| {
                stored
                    .reset
                    .as_ref()
                    .is_some_and(|(stored_digest, expires)| {
                        stored_digest == digest && *expires > now
                    })
            })
            .map(StoredAccount::credentials))
    }

    async fn consume_reset_token(
        &self,
        id: &UserId,
        digest: &ResetTokenDigest,
        hash: &PasswordHash,
    ) -> Result<bool, AccountPersistenceError> {
        let mut state = self.state();
        let Some(stored) = state.account_mut(id) else {
            return Ok(false);
        };
        if stored
            .reset
            .as_ref()
            .is_none_or(|(stored_digest, _)| stored_digest != digest)
        {
            return Ok(false);
        }
        stored.reset = None;
        stored.password_hash = hash.clone();
        Ok(true)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, AccountPersistenceError> {
        let mut state = self.state();
        let before = state.accounts.len();
        state.accounts.retain(|stored| stored.account.user.id() != id);
        if state.accounts.len() == before {
            return Ok(false);
        }
        state.refresh_tokens.retain(|token| token.user_id != *id);
        if let Some(profile_id) = state.profile_id(id) {
            state.profiles.retain(|profile| profile.id != profile_id);
            state.skills.retain(|record| record.profile_id != profile_id);
            state.projects.retain(|record| record.profile_id != profile_id);
            state.experiences.retain(|record| record.profile_id != profile_id);
            state.education.retain(|record| record.profile_id != profile_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn record(&self, token: &RefreshTokenRecord) -> Result<(), RefreshTokenPersistenceError> {
        self.state().refresh_tokens.push(token.clone());
        Ok(())
    }

    async fn find(
        &self,
        id: &RefreshTokenId,
    ) -> Result<Option<RefreshTokenRecord>, RefreshTokenPersistenceError> {
        Ok(self
            .state()
            .refresh_tokens
            .iter()
            .find(|token| token.id == *id)
            .cloned())
    }

    async fn revoke(
        &self,
        id: &RefreshTokenId,
        at: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenPersistenceError> {
        let mut state = self.state();
        let Some(token) = state
            .refresh_tokens
            .iter_mut()
            .find(|token| token.id == *id && token.revoked_at.is_none())
        else {
            return Ok(false);
        };
        token.revoked_at = Some(at);
        Ok(true)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<usize, RefreshTokenPersistenceError> {
        let mut revoked = 0;
        for token in self
            .state()
            .refresh_tokens
            .iter_mut()
            .filter(|token| token.user_id == *user_id && token.revoked_at.is_none())
        {
            token.revoked_at = Some(at);
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[async_trait]
impl PortfolioProfileRepository for InMemoryStore {
    async fn overview(
        &self,
        owner: &UserId,
    ) -> Result<Option<PortfolioOverview>, PortfolioPersistenceError> {
        let state = self.state();
        let Some(profile) = state.profiles.iter().find(|profile| profile.owner == *owner) else {
            return Ok(None);
        };
        let user = state
            .account(owner)
            .map(|stored| stored.account.user.clone())
            .ok_or_else(|| PortfolioPersistenceError::query("profile owner missing"))?;
        let id = profile.id;
        Ok(Some(PortfolioOverview {
            profile: profile.clone(),
            owner: user,
            skills: owned(&state.skills, id, |record| record.profile_id),
            projects: owned(&state.projects, id, |record| record.profile_id),
            experiences: owned(&state.experiences, id, |record| record.profile_id),
            education: owned(&state.education, id, |record| record.profile_id),
        }))
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<PortfolioProfile>, PortfolioPersistenceError> {
        Ok(self
            .state()
            .profiles
            .iter()
            .find(|profile| profile.owner == *owner)
            .cloned())
    }

    async fn create_for_owner(
        &self,
        owner: &UserId,
    ) -> Result<PortfolioProfile, PortfolioPersistenceError> {
        let mut state = self.state();
        if let Some(existing) = state.profiles.iter().find(|profile| profile.owner == *owner) {
            return Ok(existing.clone());
        }
        let profile = State::new_profile(owner);
        state.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn profile_exists(&self, id: &ProfileId) -> Result<bool, PortfolioPersistenceError> {
        Ok(self.state().profiles.iter().any(|profile| profile.id == *id))
    }

    async fn update_details(
        &self,
        owner: &UserId,
        details: &ProfileDetails,
    ) -> Result<Option<PortfolioProfile>, PortfolioPersistenceError> {
        let mut state = self.state();
        let Some(profile) = state
            .profiles
            .iter_mut()
            .find(|profile| profile.owner == *owner)
        else {
            return Ok(None);
        };
        profile.details = details.clone();
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }
}

fn owned<R: Clone>(
    records: &[R],
    profile: ProfileId,
    profile_of: impl Fn(&R) -> ProfileId,
) -> Vec<R> {
    records
        .iter()
        .filter(|record| profile_of(record) == profile)
        .cloned()
        .collect()
}

fn build_skill(
    id: RecordId,
    profile_id: ProfileId,
    draft: &SkillDraft,
    created_at: DateTime<Utc>,
) -> Skill {
    Skill {
        id,
        profile_id,
        name: draft.name.clone(),
        created_at,
        updated_at: Utc::now(),
    }
}

fn build_project(
    id: RecordId,
    profile_id: ProfileId,
    draft: &ProjectDraft,
    created_at: DateTime<Utc>,
) -> Project {
    Project {
        id,
        profile_id,
        title: draft.title.clone(),
        description: draft.description.clone(),
        image: draft.image.clone(),
        live_url: draft.live_url.clone(),
        source_url: draft.source_url.clone(),
        technologies: draft
            .technologies
            .iter()
            .map(|name| Technology {
                id: RecordId::random(),
                name: name.clone(),
            })
            .collect(),
        created_at,
        updated_at: Utc::now(),
    }
}

fn build_experience(
    id: RecordId,
    profile_id: ProfileId,
    draft: &ExperienceDraft,
    created_at: DateTime<Utc>,
) -> Experience {
    Experience {
        id,
        profile_id,
        company: draft.company.clone(),
        position: draft.position.clone(),
        description: draft.description.clone(),
        period: draft.period,
        created_at,
        updated_at: Utc::now(),
    }
}

fn build_education(
    id: RecordId,
    profile_id: ProfileId,
    draft: &EducationDraft,
    created_at: DateTime<Utc>,
) -> Education {
    Education {
        id,
        profile_id,
        institution: draft.institution.clone(),
        degree: draft.degree.clone(),
        field_of_study: draft.field_of_study.clone(),
        description: draft.description.clone(),
        period: draft.period,
        created_at,
        updated_at: Utc::now(),
    }
}

macro_rules! memory_records {
    ($($record:ident => $table:ident, $build:ident;)+) => {
        $(
            #[async_trait]
            impl PortfolioRecordRepository<$record> for InMemoryStore {
                async fn list(&self, owner: &UserId) -> Result<Vec<$record>, PortfolioPersistenceError> {
                    let state = self.state();
                    Ok(match state.profile_id(owner) {
                        Some(profile) => owned(&state.$table, profile, |record| record.profile_id),
                        None => Vec::new(),
                    })
                }

                async fn find(
                    &self,
                    owner: &UserId,
                    id: &RecordId,
                ) -> Result<Option<$record>, PortfolioPersistenceError> {
                    let state = self.state();
                    let Some(profile) = state.profile_id(owner) else {
                        return Ok(None);
                    };
                    Ok(state
                        .$table
                        .iter()
                        .find(|record| record.id == *id && record.profile_id == profile)
                        .cloned())
                }

                async fn insert(
                    &self,
                    owner: &UserId,
                    draft: &<$record as crate::domain::PortfolioRecord>::Draft,
                ) -> Result<$record, PortfolioPersistenceError> {
                    let mut state = self.state();
                    let profile = state
                        .profile_id(owner)
                        .ok_or(PortfolioPersistenceError::ProfileMissing)?;
                    let record = $build(RecordId::random(), profile, draft, Utc::now());
                    state.$table.push(record.clone());
                    Ok(record)
                }

                async fn update(
                    &self,
                    owner: &UserId,
                    id: &RecordId,
                    draft: &<$record as crate::domain::PortfolioRecord>::Draft,
                ) -> Result<Option<$record>, PortfolioPersistenceError> {
                    let mut state = self.state();
                    let Some(profile) = state.profile_id(owner) else {
                        return Ok(None);
                    };
                    let Some(slot) = state
                        .$table
                        .iter_mut()
                        .find(|record| record.id == *id && record.profile_id == profile)
                    else {
                        return Ok(None);
                    };
                    *slot = $build(slot.id, profile, draft, slot.created_at);
                    Ok(Some(slot.clone()))
                }

                async fn delete(
                    &self,
                    owner: &UserId,
                    id: &RecordId,
                ) -> Result<bool, PortfolioPersistenceError> {
                    let mut state = self.state();
                    let Some(profile) = state.profile_id(owner) else {
                        return Ok(false);
                    };
                    let before = state.$table.len();
                    state
                        .$table
                        .retain(|record| !(record.id == *id && record.profile_id == profile));
                    Ok(state.$table.len() != before)
                }
            }
        )+
    };
}

memory_records! {
    Skill => skills, build_skill;
    Project => projects, build_project;
    Experience => experiences, build_experience;
    Education => education, build_education;
}
