//! PostgreSQL persistence adapters built on Diesel.
//!
//! Adapters only translate between Diesel rows and domain types; every
//! rule lives in the domain services. Row structs (`models.rs`) and table
//! definitions (`schema.rs`) never leave this module.
//!
//! ```ignore
//! use portfolio_backend::outbound::persistence::{DbPool, DieselAccountRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/portfolio")).await?;
//! let accounts = DieselAccountRepository::new(pool.clone());
//! ```

mod diesel_account_repository;
mod diesel_basic_error_mapping;
mod diesel_portfolio_profile_repository;
mod diesel_portfolio_records;
mod diesel_refresh_token_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_portfolio_profile_repository::DieselPortfolioProfileRepository;
pub use diesel_portfolio_records::DieselPortfolioRecordRepository;
pub use diesel_refresh_token_repository::DieselRefreshTokenRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
