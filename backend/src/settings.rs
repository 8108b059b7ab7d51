//! Server settings loaded via OrthoConfig.
//!
//! Values come from `PORTFOLIO_*` environment variables, command-line flags
//! or a configuration file. The database URL additionally falls back to the
//! conventional `DATABASE_URL` variable.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings controlling how the server binds and reaches PostgreSQL.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTFOLIO")]
pub struct ServerSettings {
    /// Interface to listen on.
    pub host: Option<IpAddr>,
    /// TCP port to listen on.
    pub port: Option<u16>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_max_size: Option<u32>,
    /// Apply pending migrations before serving. Defaults to `true`.
    pub run_migrations: Option<bool>,
}

/// Errors raised while resolving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no database URL configured; set PORTFOLIO_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
}

impl ServerSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Whether pending migrations should run at start-up.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Database URL from the settings, else from `fallback`.
    ///
    /// # Examples
    /// ```
    /// # use portfolio_backend::settings::ServerSettings;
    /// let settings = ServerSettings {
    ///     host: None,
    ///     port: None,
    ///     database_url: None,
    ///     pool_max_size: None,
    ///     run_migrations: None,
    /// };
    /// let url = settings
    ///     .database_url(Some("postgres://localhost/portfolio".to_owned()))
    ///     .expect("fallback applies");
    /// assert_eq!(url, "postgres://localhost/portfolio");
    /// ```
    pub fn database_url(&self, fallback: Option<String>) -> Result<String, SettingsError> {
        self.database_url
            .clone()
            .or(fallback)
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }
}
