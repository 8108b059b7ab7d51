//! Backend entry-point: loads settings, prepares PostgreSQL and serves the
//! REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::{DefaultEnv, Env};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portfolio_backend::inbound::http::health::HealthState;
use portfolio_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use portfolio_backend::outbound::security::{BuildMode, token_settings_from_env};
use portfolio_backend::settings::ServerSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("load server settings")?;
    let env = DefaultEnv::new();
    let database_url = settings.database_url(env.string("DATABASE_URL"))?;
    let tokens = token_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("load token settings")?;

    if settings.run_migrations() {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("apply database migrations")?;
    }

    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("create database pool")?;

    let bind_addr = settings.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(bind_addr, pool, tokens),
    )
    .wrap_err_with(|| format!("bind {bind_addr}"))?;

    info!(%bind_addr, "portfolio backend listening");
    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}
