//! Builders wiring Diesel repositories and credential adapters into the
//! domain services behind [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use portfolio_backend::domain::ports::PortfolioCollection;
use portfolio_backend::domain::{
    AccountSecurity, AccountService, Education, Experience, PortfolioCollectionService,
    PortfolioProfileService, PortfolioRecord, Project, Skill,
};
use portfolio_backend::inbound::http::state::{AccountPorts, HttpState, PortfolioPorts};
use portfolio_backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselPortfolioProfileRepository,
    DieselPortfolioRecordRepository, DieselRefreshTokenRepository,
};
use portfolio_backend::outbound::security::{
    Argon2PasswordHasher, JwtTokenIssuer, LoggingResetNotifier, TokenSettings,
};

use super::ServerConfig;

fn build_account_ports(pool: &DbPool, tokens: &TokenSettings) -> AccountPorts {
    let issuer = Arc::new(JwtTokenIssuer::new(
        tokens.signing_key.as_slice(),
        tokens.issuer.clone(),
        tokens.lifetimes,
    ));
    let service = Arc::new(
        AccountService::new(
            Arc::new(DieselAccountRepository::new(pool.clone())),
            Arc::new(DieselRefreshTokenRepository::new(pool.clone())),
            AccountSecurity {
                tokens: issuer,
                hasher: Arc::new(Argon2PasswordHasher::new()),
                notifier: Arc::new(LoggingResetNotifier),
            },
            Arc::new(DefaultClock),
        )
        .with_reset_ttl(tokens.reset_ttl),
    );

    AccountPorts {
        accounts: service.clone(),
        account_profile: service.clone(),
        verifier: service,
    }
}

fn collection<R: PortfolioRecord>(
    records: &Arc<DieselPortfolioRecordRepository>,
) -> Arc<dyn PortfolioCollection<R>>
where
    PortfolioCollectionService<R, DieselPortfolioRecordRepository>: PortfolioCollection<R>,
{
    Arc::new(PortfolioCollectionService::<R, _>::new(Arc::clone(records)))
}

fn build_portfolio_ports(pool: &DbPool) -> PortfolioPorts {
    let records = Arc::new(DieselPortfolioRecordRepository::new(pool.clone()));
    PortfolioPorts {
        profiles: Arc::new(PortfolioProfileService::new(Arc::new(
            DieselPortfolioProfileRepository::new(pool.clone()),
        ))),
        skills: collection::<Skill>(&records),
        projects: collection::<Project>(&records),
        experiences: collection::<Experience>(&records),
        education: collection::<Education>(&records),
    }
}

/// Assemble handler state from the server configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        build_account_ports(&config.db_pool, &config.tokens),
        build_portfolio_ports(&config.db_pool),
    ))
}
