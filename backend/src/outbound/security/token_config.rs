//! Token configuration parsing and validation.
//!
//! This module centralises the environment-driven signing key, issuer and
//! lifetime settings so they are validated consistently and can be tested in
//! isolation.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::TimeDelta;
use mockable::Env;
use rand::RngCore;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

use crate::domain::DEFAULT_RESET_TOKEN_TTL_SECS;

use super::jwt_token_issuer::TokenLifetimes;

const SIGNING_KEY_DEFAULT_PATH: &str = "/var/run/secrets/token_signing_key";
const SIGNING_KEY_MIN_LEN: usize = 32;
const DEFAULT_ISSUER: &str = "portfolio-backend";
const DEFAULT_ACCESS_TTL_SECS: i64 = 300;
const DEFAULT_REFRESH_TTL_SECS: i64 = 86_400;
const KEY_FILE_ENV: &str = "TOKEN_SIGNING_KEY_FILE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const ISSUER_ENV: &str = "TOKEN_ISSUER";
const ACCESS_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
const REFRESH_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
const RESET_TTL_ENV: &str = "PASSWORD_RESET_TTL_SECS";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SECONDS_EXPECTED: &str = "a positive number of seconds";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate a missing key and fall back to a random one.
    Debug,
    /// Release builds require a readable key of adequate length.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use portfolio_backend::outbound::security::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Token settings derived from the environment.
pub struct TokenSettings {
    /// HMAC secret shared by signing and verification.
    pub signing_key: Zeroizing<Vec<u8>>,
    /// `iss` claim written into and required from every token.
    pub issuer: String,
    pub lifetimes: TokenLifetimes,
    /// How long a password reset token stays usable.
    pub reset_ttl: TimeDelta,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("signing_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("lifetimes", &self.lifetimes)
            .field("reset_ttl", &self.reset_ttl)
            .finish()
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the signing key file failed.
    #[error("failed to read token signing key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The key file exists but is too short for release builds.
    #[error("token signing key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use portfolio_backend::outbound::security::{BuildMode, token_settings_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("token_key_example");
/// std::fs::write(&key_path, vec![b'k'; 32])?;
///
/// let key_path = key_path.to_str().expect("valid path").to_string();
/// let mut env = MockEnv::new();
/// env.expect_string()
///     .returning(move |name| match name {
///         "TOKEN_SIGNING_KEY_FILE" => Some(key_path.clone()),
///         "ACCESS_TOKEN_TTL_SECS" => Some("600".to_string()),
///         _ => None,
///     });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release)?;
/// assert_eq!(settings.lifetimes.access.num_seconds(), 600);
/// assert_eq!(settings.issuer, "portfolio-backend");
/// # Ok(())
/// # }
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let signing_key = signing_key_from_env(env, mode, allow_ephemeral)?;
    let issuer = env
        .string(ISSUER_ENV)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ISSUER.to_owned());

    Ok(TokenSettings {
        signing_key,
        issuer,
        lifetimes: TokenLifetimes {
            access: seconds_from_env(env, ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL_SECS)?,
            refresh: seconds_from_env(env, REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL_SECS)?,
        },
        reset_ttl: seconds_from_env(env, RESET_TTL_ENV, DEFAULT_RESET_TOKEN_TTL_SECS)?,
    })
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid TOKEN_ALLOW_EPHEMERAL; defaulting to disabled");
            Ok(false)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn seconds_from_env<E: Env>(
    env: &E,
    name: &'static str,
    default: i64,
) -> Result<TimeDelta, TokenConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(TimeDelta::seconds(default));
    };
    match value.trim().parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(TimeDelta::seconds(seconds)),
        _ => Err(TokenConfigError::InvalidEnv {
            name,
            value,
            expected: SECONDS_EXPECTED,
        }),
    }
}

fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let key_path = env
        .string(KEY_FILE_ENV)
        .unwrap_or_else(|| SIGNING_KEY_DEFAULT_PATH.to_string());
    let path = PathBuf::from(key_path);

    match read_key(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SIGNING_KEY_MIN_LEN {
                if mode == BuildMode::Release {
                    bytes.zeroize();
                    return Err(TokenConfigError::KeyTooShort {
                        path,
                        length,
                        min_len: SIGNING_KEY_MIN_LEN,
                    });
                }
                warn!(path = %path.display(), length, "token signing key is shorter than recommended");
            }
            Ok(Zeroizing::new(bytes))
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary token signing key (dev only)"
                );
                Ok(ephemeral_key())
            } else {
                Err(TokenConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn read_key(path: &Path) -> io::Result<Vec<u8>> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "key path has no file name")
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(file_name)
}

fn ephemeral_key() -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0_u8; SIGNING_KEY_MIN_LEN * 2]);
    rand::thread_rng().fill_bytes(key.as_mut_slice());
    key
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
