//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Account routes live under `/api/accounts`, portfolio routes under
//! `/api/portfolio`. Every success body is an [`envelope::Envelope`] and every
//! failure is a serialised [`crate::domain::Error`].

pub mod account_profile;
pub mod accounts;
pub mod auth;
pub mod collections;
pub mod envelope;
pub mod error;
pub mod health;
pub mod portfolio_dto;
pub mod portfolio_profiles;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every account and portfolio route on `cfg`.
///
/// The caller supplies [`state::HttpState`] as app data together with
/// [`validation::json_config`] so malformed bodies map onto the error shape.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(accounts::configure).service(
        web::scope("/api/portfolio")
            .configure(portfolio_profiles::configure)
            .configure(collections::configure),
    );
}
