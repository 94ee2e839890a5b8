//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: request and response DTOs together with the envelope
//!   wrappers in [`crate::inbound::http::schemas`], which keep domain types
//!   free of utoipa derives
//! - **Security**: `bearer` (JWT access token) and `apiKey` (`x-api-key`)
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling. The
//! `/trpc` surface is not described here.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::inbound::http::car_models::{
    CarModelResponse, CreateCarModelRequest, UpdateCarModelRequest,
};
use crate::inbound::http::cars::{
    CarModelSummaryResponse, CarResponse, CreateCarRequest, UpdateCarRequest,
};
use crate::inbound::http::manufacturers::{
    CreateManufacturerRequest, ManufacturerResponse, ManufacturerSummaryResponse,
    UpdateManufacturerRequest,
};
use crate::inbound::http::schemas::{
    AckSchema, ErrorBodySchema, ErrorCodeSchema, ErrorSchema, PageMetaSchema,
    ValidationIssueSchema,
};
use crate::inbound::http::users::{
    ApiKeyResponse, ChangeRoleRequest, UpdateProfileRequest, UserResponse,
};

/// Enrich the generated document with the bearer and API key schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by POST /api/v1/auth/login or /auth/refresh.",
                    ))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "apiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "x-api-key",
                "Key issued by POST /api/v1/users/me/api-key.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Carmarket API",
        description = "Car catalogue and marketplace: manufacturers, models, listings, and accounts.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::refresh,
        crate::inbound::http::auth::logout,
        crate::inbound::http::manufacturers::list_manufacturers,
        crate::inbound::http::manufacturers::get_manufacturer,
        crate::inbound::http::manufacturers::create_manufacturer,
        crate::inbound::http::manufacturers::update_manufacturer,
        crate::inbound::http::manufacturers::delete_manufacturer,
        crate::inbound::http::car_models::list_models,
        crate::inbound::http::car_models::get_model,
        crate::inbound::http::car_models::create_model,
        crate::inbound::http::car_models::update_model,
        crate::inbound::http::car_models::delete_model,
        crate::inbound::http::cars::list_cars,
        crate::inbound::http::cars::list_favorites,
        crate::inbound::http::cars::get_car,
        crate::inbound::http::cars::create_car,
        crate::inbound::http::cars::update_car,
        crate::inbound::http::cars::delete_car,
        crate::inbound::http::cars::add_favorite,
        crate::inbound::http::cars::remove_favorite,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::users::issue_api_key,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::change_role,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorBodySchema,
        ErrorCodeSchema,
        ValidationIssueSchema,
        AckSchema,
        PageMetaSchema,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        ManufacturerResponse,
        ManufacturerSummaryResponse,
        CreateManufacturerRequest,
        UpdateManufacturerRequest,
        CarModelResponse,
        CreateCarModelRequest,
        UpdateCarModelRequest,
        CarModelSummaryResponse,
        CarResponse,
        CreateCarRequest,
        UpdateCarRequest,
        UserResponse,
        UpdateProfileRequest,
        ChangeRoleRequest,
        ApiKeyResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and token refresh"),
        (name = "manufacturers", description = "Manufacturer catalogue"),
        (name = "models", description = "Car models per manufacturer"),
        (name = "cars", description = "Listings and favourites"),
        (name = "users", description = "Accounts, roles, and API keys"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
