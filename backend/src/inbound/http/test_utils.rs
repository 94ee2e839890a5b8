//! Test helpers for inbound HTTP and tRPC components.
//!
//! Ports default to mocks with no expectations, so a handler touching a port
//! its test did not prime fails loudly. Sample aggregates come from
//! [`crate::domain::test_fixtures`].

use std::sync::Arc;

use actix_web::web;

use crate::domain::Principal;
use crate::domain::ports::{
    MockAuthenticator, MockCarListings, MockCarModelCatalog, MockManufacturerCatalog,
    MockUserAccounts,
};

use super::auth::RefreshCookiePolicy;
use super::state::{HttpState, HttpStatePorts};

/// Builder assembling [`HttpState`] from mocks.
#[derive(Default)]
pub struct StateBuilder {
    auth: MockAuthenticator,
    manufacturers: MockManufacturerCatalog,
    models: MockCarModelCatalog,
    cars: MockCarListings,
    users: MockUserAccounts,
}

impl StateBuilder {
    pub fn auth(mut self, auth: MockAuthenticator) -> Self {
        self.auth = auth;
        self
    }

    pub fn manufacturers(mut self, manufacturers: MockManufacturerCatalog) -> Self {
        self.manufacturers = manufacturers;
        self
    }

    pub fn models(mut self, models: MockCarModelCatalog) -> Self {
        self.models = models;
        self
    }

    pub fn cars(mut self, cars: MockCarListings) -> Self {
        self.cars = cars;
        self
    }

    pub fn users(mut self, users: MockUserAccounts) -> Self {
        self.users = users;
        self
    }

    pub fn build(self) -> web::Data<HttpState> {
        let ports = HttpStatePorts {
            auth: Arc::new(self.auth),
            manufacturers: Arc::new(self.manufacturers),
            models: Arc::new(self.models),
            cars: Arc::new(self.cars),
            users: Arc::new(self.users),
        };
        web::Data::new(HttpState::new(
            ports,
            RefreshCookiePolicy {
                secure: false,
                ..RefreshCookiePolicy::default()
            },
        ))
    }
}

/// Mock authenticator accepting `Bearer <token>` for exactly one principal.
pub fn bearer_auth(token: &'static str, principal: Principal) -> MockAuthenticator {
    let mut auth = MockAuthenticator::new();
    auth.expect_authenticate_bearer()
        .withf(move |presented| presented == token)
        .returning(move |_| Ok(principal));
    auth
}
