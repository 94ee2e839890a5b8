//! Wiring of domain services onto Diesel repositories and credential adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use crate::domain::{
    AuthService, CarListingService, CarModelService, ManufacturerService, UserAccountService,
};
use crate::inbound::http::auth::RefreshCookiePolicy;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::persistence::{
    DbPool, DieselCarModelRepository, DieselCarRepository, DieselManufacturerRepository,
    DieselUserRepository,
};
use crate::outbound::security::{
    Argon2PasswordHasher, JwtSecrets, JwtTokenService, Sha256ApiKeyMinter, TokenLifetimes,
};

/// Inputs needed to assemble [`HttpState`].
pub struct StateConfig<'a> {
    pub pool: &'a DbPool,
    pub secrets: &'a JwtSecrets,
    pub lifetimes: TokenLifetimes,
    pub refresh_cookie: RefreshCookiePolicy,
}

/// Build the handler state from a pool and authentication settings.
pub fn build_http_state(config: StateConfig<'_>) -> web::Data<HttpState> {
    build_http_state_with_clock(config, Arc::new(DefaultClock))
}

/// Like [`build_http_state`] with an explicit clock.
pub fn build_http_state_with_clock(
    config: StateConfig<'_>,
    clock: Arc<dyn Clock>,
) -> web::Data<HttpState> {
    let StateConfig {
        pool,
        secrets,
        lifetimes,
        refresh_cookie,
    } = config;

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let keys = Arc::new(Sha256ApiKeyMinter);
    let tokens = Arc::new(JwtTokenService::new(secrets, lifetimes, Arc::clone(&clock)));

    let ports = HttpStatePorts {
        auth: Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::new(Argon2PasswordHasher),
            tokens,
            Arc::clone(&keys),
        )),
        manufacturers: Arc::new(ManufacturerService::new(Arc::new(
            DieselManufacturerRepository::new(pool.clone()),
        ))),
        models: Arc::new(CarModelService::new(Arc::new(
            DieselCarModelRepository::new(pool.clone()),
        ))),
        cars: Arc::new(CarListingService::new(
            Arc::new(DieselCarRepository::new(pool.clone())),
            Arc::clone(&clock),
        )),
        users: Arc::new(UserAccountService::new(users, keys, clock)),
    };
    web::Data::new(HttpState::new(ports, refresh_cookie))
}
