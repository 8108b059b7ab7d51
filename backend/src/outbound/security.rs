//! Credential adapters: JWT bearer tokens, Argon2id password hashes,
//! reset token delivery and the environment-driven token settings.

mod argon2_password_hasher;
mod jwt_token_issuer;
mod logging_reset_notifier;
mod token_config;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use jwt_token_issuer::{JwtTokenIssuer, TokenLifetimes};
pub use logging_reset_notifier::LoggingResetNotifier;
pub use token_config::{BuildMode, TokenConfigError, TokenSettings, token_settings_from_env};
