//! Carmarket entry-point: loads settings, applies migrations, and serves the
//! REST, tRPC, and health endpoints.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use carmarket::inbound::http::health::HealthState;
use carmarket::outbound::persistence::{DbPool, PoolConfig, migrate};
use carmarket::server::{
    AppSettings, BuildMode, ServerConfig, auth_settings_from_env, create_server,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(std::io::Error::other)?;
    let auth = auth_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let lifetimes = settings.token_lifetimes().map_err(std::io::Error::other)?;
    let rate_limits = settings.rate_limits().map_err(std::io::Error::other)?;
    let database_url = settings
        .database_url()
        .map_err(std::io::Error::other)?
        .to_owned();

    if settings.run_migrations {
        let applied = migrate(database_url.clone())
            .await
            .map_err(std::io::Error::other)?;
        info!(applied, "database migrations complete");
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.db_pool_size))
        .await
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new().with_probe(Arc::new(pool.clone())));
    let config = ServerConfig::new(bind_addr, pool, auth)
        .with_token_lifetimes(lifetimes)
        .with_rate_limits(rate_limits);

    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}
