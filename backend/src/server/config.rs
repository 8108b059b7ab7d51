//! HTTP server configuration object and helpers.

use portfolio_backend::outbound::persistence::DbPool;
use portfolio_backend::outbound::security::TokenSettings;
use std::net::SocketAddr;

/// Everything the server needs once settings are resolved and the pool is up.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) tokens: TokenSettings,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, tokens: TokenSettings) -> Self {
        Self {
            bind_addr,
            db_pool,
            tokens,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
