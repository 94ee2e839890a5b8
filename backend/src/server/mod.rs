//! Server construction and middleware wiring.

mod auth_config;
mod config;
mod settings;
mod state_builders;

pub use auth_config::{
    AuthConfigError, AuthSettings, BuildMode, SECRET_MIN_LEN, auth_settings_from_env,
};
pub use config::{RateLimits, ServerConfig};
pub use settings::{AppSettings, SettingsError};
pub use state_builders::{StateConfig, build_http_state, build_http_state_with_clock};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, error, validation};
use crate::middleware::{Throttle, Trace};

/// Shared state handed to every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    /// Limits applied to every API and tRPC request. The tRPC scope shares
    /// its counters but answers in the tRPC error shape.
    pub throttle: Throttle,
    /// Additional limits for `/api/v1/auth`.
    pub auth_throttle: Throttle,
}

impl AppDependencies {
    /// Dependencies throttled by `limits`.
    #[must_use]
    pub fn new(
        health_state: web::Data<HealthState>,
        http_state: web::Data<HttpState>,
        limits: RateLimits,
    ) -> Self {
        let RateLimits { general, auth } = limits;
        Self {
            health_state,
            http_state,
            throttle: Throttle::new(general),
            auth_throttle: Throttle::new(vec![auth]),
        }
    }
}

/// Assemble the application: REST under `/api/v1`, procedures under
/// `/trpc`, health probes at the root, and Swagger UI in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        throttle,
        auth_throttle,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(throttle.clone())
        .service(auth::scope().wrap(auth_throttle))
        .configure(inbound::http::configure)
        .default_service(web::to(error::unknown_route));

    let trpc = web::scope("/trpc")
        .wrap(throttle.rejecting_with(inbound::trpc::rejection_response))
        .configure(inbound::trpc::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(validation::json_config())
        .wrap(Trace)
        .service(api)
        .service(trpc)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        db_pool,
        auth,
        lifetimes,
        rate_limits,
    } = config;
    let http_state = build_http_state(StateConfig {
        pool: &db_pool,
        secrets: &auth.secrets,
        lifetimes,
        refresh_cookie: auth.refresh_cookie,
    });
    let deps = AppDependencies::new(health_state.clone(), http_state, rate_limits);

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
