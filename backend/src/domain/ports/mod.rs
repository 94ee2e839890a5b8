//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, tokens) are implemented by outbound
//! adapters. Driving ports (catalogues, listings, accounts, authenticator)
//! are implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod api_key_minter;
mod authenticator;
mod car_listings;
mod car_model_catalog;
mod car_model_repository;
mod car_repository;
mod manufacturer_catalog;
mod manufacturer_repository;
mod password_hasher;
mod readiness_probe;
mod repository_error;
mod token_service;
mod user_accounts;
mod user_repository;

pub use api_key_minter::ApiKeyMinter;
#[cfg(test)]
pub use api_key_minter::MockApiKeyMinter;
pub use authenticator::Authenticator;
#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use car_listings::CarListings;
#[cfg(test)]
pub use car_listings::MockCarListings;
pub use car_model_catalog::CarModelCatalog;
#[cfg(test)]
pub use car_model_catalog::MockCarModelCatalog;
pub use car_model_repository::CarModelRepository;
#[cfg(test)]
pub use car_model_repository::MockCarModelRepository;
pub use car_repository::CarRepository;
#[cfg(test)]
pub use car_repository::MockCarRepository;
pub use manufacturer_catalog::ManufacturerCatalog;
#[cfg(test)]
pub use manufacturer_catalog::MockManufacturerCatalog;
#[cfg(test)]
pub use manufacturer_repository::MockManufacturerRepository;
pub use manufacturer_repository::ManufacturerRepository;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use readiness_probe::MockReadinessProbe;
pub use readiness_probe::ReadinessProbe;
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::UserAccounts;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{NewUserRecord, StoredApiKey, StoredCredentials, UserRepository};
