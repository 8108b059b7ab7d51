//! Test utilities for the backend crate.
//!
//! Integration tests in `tests/` drive the real domain services and HTTP
//! handlers against [`InMemoryStore`] instead of PostgreSQL. Only compiled
//! with the `test-support` feature.

mod memory_store;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::DefaultClock;

pub use memory_store::InMemoryStore;

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, PortfolioCollection, ResetNotifier, ResetNotifierError,
};
use crate::domain::{
    AccountSecurity, AccountService, Education, Experience, PasswordHash, PlainPassword,
    PortfolioCollectionService, PortfolioProfileService, PortfolioRecord, Project, ResetToken,
    Skill, User,
};
use crate::inbound::http::state::{AccountPorts, HttpState, PortfolioPorts};
use crate::outbound::security::{JwtTokenIssuer, TokenLifetimes};

/// Signing secret shared by every test backend.
pub const TEST_SIGNING_KEY: &[u8] = b"test-signing-key-with-at-least-32-bytes";

const PLAINTEXT_PREFIX: &str = "plain$";

/// Password "hasher" that stores the password verbatim behind a marker.
///
/// Argon2 is deliberately slow; tests that register many users use this.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextPasswordHasher;

impl PasswordHasher for PlaintextPasswordHasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, PasswordHashError> {
        Ok(PasswordHash::from_phc(format!(
            "{PLAINTEXT_PREFIX}{}",
            password.expose()
        )))
    }

    fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let stored = hash
            .as_str()
            .strip_prefix(PLAINTEXT_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed("missing plaintext marker"))?;
        Ok(stored == password.expose())
    }
}

/// Reset notifier that keeps the latest token per email address.
#[derive(Debug, Default)]
pub struct RecordingResetNotifier {
    tokens: Mutex<HashMap<String, String>>,
}

impl RecordingResetNotifier {
    /// Latest token delivered to `email`.
    pub fn token_for(&self, email: &str) -> Option<String> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
    }
}

#[async_trait]
impl ResetNotifier for RecordingResetNotifier {
    async fn deliver(
        &self,
        user: &User,
        token: &ResetToken,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), ResetNotifierError> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.email().as_str().to_owned(), token.expose().to_owned());
        Ok(())
    }
}

/// Real services wired to in-memory adapters.
pub struct TestBackend {
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingResetNotifier>,
    pub state: HttpState,
}

impl TestBackend {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingResetNotifier::default());
        let service = Arc::new(AccountService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            AccountSecurity {
                tokens: Arc::new(JwtTokenIssuer::new(
                    TEST_SIGNING_KEY,
                    "portfolio-backend-tests",
                    TokenLifetimes::default(),
                )),
                hasher: Arc::new(PlaintextPasswordHasher),
                notifier: notifier.clone(),
            },
            Arc::new(DefaultClock),
        ));

        let accounts = AccountPorts {
            accounts: service.clone(),
            account_profile: service.clone(),
            verifier: service,
        };
        let portfolio = PortfolioPorts {
            profiles: Arc::new(PortfolioProfileService::new(Arc::clone(&store))),
            skills: collection::<Skill>(&store),
            projects: collection::<Project>(&store),
            experiences: collection::<Experience>(&store),
            education: collection::<Education>(&store),
        };

        Self {
            store,
            notifier,
            state: HttpState::new(accounts, portfolio),
        }
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn collection<R: PortfolioRecord>(store: &Arc<InMemoryStore>) -> Arc<dyn PortfolioCollection<R>>
where
    PortfolioCollectionService<R, InMemoryStore>: PortfolioCollection<R>,
{
    Arc::new(PortfolioCollectionService::<R, _>::new(Arc::clone(store)))
}
