//! HTTP inbound adapter exposing the REST API under `/api/v1`.
//!
//! Handlers translate requests into driving-port calls and render results
//! through the JSON envelopes in [`envelope`]. Query strings are validated by
//! the declarative schemas in [`query_schema`], which also document them in
//! OpenAPI.

pub mod auth;
pub mod car_models;
pub mod cars;
pub mod envelope;
pub mod error;
pub mod health;
pub mod manufacturers;
pub mod principal;
pub mod query_schema;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every resource route except auth, which is mounted separately
/// so it can carry its own rate limit.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(manufacturers::configure)
        .configure(car_models::configure)
        .configure(cars::configure)
        .configure(users::configure);
}
