//! Test helpers for inbound HTTP components.
//!
//! [`MockPorts`] holds one mock per driving port. Tests set expectations on
//! the ports they exercise and convert the bundle into [`HttpState`]; ports
//! left untouched panic if a handler unexpectedly calls them.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::NormalizePath;
use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    MockAccessTokenVerifier, MockAccountCommand, MockAccountProfileCommand,
    MockPortfolioCollection, MockPortfolioProfileCommand,
};
use crate::domain::{
    Account, ContactDetails, EmailAddress, Education, Error, Experience, FullName,
    PortfolioOverview, PortfolioProfile, ProfileDetails, ProfileId, Project, Skill, User, UserId,
    Username,
};
use crate::inbound::http::state::{AccountPorts, HttpState, PortfolioPorts};
use crate::inbound::http::validation::json_config;
use crate::middleware::Trace;

/// Bearer token accepted by the verifier installed by [`MockPorts`].
pub const TEST_TOKEN: &str = "test-access-token";

const TEST_USER_ID: &str = "11111111-1111-4111-8111-111111111111";

/// Identity every request carrying [`TEST_TOKEN`] resolves to.
pub fn test_user_id() -> UserId {
    UserId::new(TEST_USER_ID).expect("fixture user id")
}

/// Fixed instant used for every timestamp in fixtures.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// `Authorization` header value for [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}

/// The caller's identity.
pub fn sample_user() -> User {
    User::new(
        test_user_id(),
        Username::new("ada").expect("fixture username"),
        EmailAddress::new("ada@example.com").expect("fixture email"),
        FullName::new("Ada Lovelace").expect("fixture full name"),
        fixed_time(),
    )
}

pub fn sample_account() -> Account {
    Account {
        user: sample_user(),
        contact: ContactDetails {
            title: "Engineer".to_owned(),
            ..ContactDetails::default()
        },
    }
}

/// An empty portfolio owned by [`sample_user`].
pub fn sample_overview() -> PortfolioOverview {
    PortfolioOverview {
        profile: PortfolioProfile {
            id: ProfileId::from(Uuid::nil()),
            owner: test_user_id(),
            details: ProfileDetails::default(),
            created_at: fixed_time(),
            updated_at: fixed_time(),
        },
        owner: sample_user(),
        skills: Vec::new(),
        projects: Vec::new(),
        experiences: Vec::new(),
        education: Vec::new(),
    }
}

/// One mock per driving port.
#[derive(Default)]
pub struct MockPorts {
    pub accounts: MockAccountCommand,
    pub account_profile: MockAccountProfileCommand,
    pub profiles: MockPortfolioProfileCommand,
    pub skills: MockPortfolioCollection<Skill>,
    pub projects: MockPortfolioCollection<Project>,
    pub experiences: MockPortfolioCollection<Experience>,
    pub education: MockPortfolioCollection<Education>,
}

impl MockPorts {
    /// Build handler state; the verifier accepts only [`TEST_TOKEN`].
    pub fn into_state(self) -> HttpState {
        let mut verifier = MockAccessTokenVerifier::new();
        verifier.expect_verify().returning(|token| {
            if token == TEST_TOKEN {
                Ok(test_user_id())
            } else {
                Err(Error::unauthorized("Given token not valid for any token type"))
            }
        });

        HttpState::new(
            AccountPorts {
                accounts: Arc::new(self.accounts),
                account_profile: Arc::new(self.account_profile),
                verifier: Arc::new(verifier),
            },
            PortfolioPorts {
                profiles: Arc::new(self.profiles),
                skills: Arc::new(self.skills),
                projects: Arc::new(self.projects),
                experiences: Arc::new(self.experiences),
                education: Arc::new(self.education),
            },
        )
    }
}

/// Application wired like production: JSON error mapping, optional trailing
/// slashes and trace ids, with every route registered.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(NormalizePath::trim())
        .wrap(Trace)
        .configure(super::configure)
}
