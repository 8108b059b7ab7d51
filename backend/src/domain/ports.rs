//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (repositories, token issuer, password hasher, reset
//! notifier) describe what the domain needs from the outside world. Driving
//! ports (commands) are what inbound adapters call. Each driven trait exposes
//! a strongly typed error generated by [`define_port_error!`] so adapters map
//! their failures into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_repository;
mod password_hasher;
mod portfolio_collection;
mod portfolio_profile_command;
mod portfolio_profile_repository;
mod portfolio_record_repository;
mod refresh_token_repository;
mod reset_notifier;
mod token_issuer;

#[cfg(test)]
pub use account_command::{
    MockAccessTokenVerifier, MockAccountCommand, MockAccountProfileCommand,
};
pub use account_command::{AccessTokenVerifier, AccountCommand, AccountProfileCommand, AuthSession};
#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{
    AccountPersistenceError, AccountRepository, NewAccount, StoredCredentials,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use portfolio_collection::MockPortfolioCollection;
pub use portfolio_collection::PortfolioCollection;
#[cfg(test)]
pub use portfolio_profile_command::MockPortfolioProfileCommand;
pub use portfolio_profile_command::PortfolioProfileCommand;
#[cfg(test)]
pub use portfolio_profile_repository::MockPortfolioProfileRepository;
pub use portfolio_profile_repository::{PortfolioPersistenceError, PortfolioProfileRepository};
#[cfg(test)]
pub use portfolio_record_repository::MockPortfolioRecordRepository;
pub use portfolio_record_repository::PortfolioRecordRepository;
#[cfg(test)]
pub use refresh_token_repository::MockRefreshTokenRepository;
pub use refresh_token_repository::{RefreshTokenPersistenceError, RefreshTokenRepository};
#[cfg(test)]
pub use reset_notifier::MockResetNotifier;
pub use reset_notifier::{ResetNotifier, ResetNotifierError};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{IssuedRefreshToken, TokenError, TokenIssuer};
