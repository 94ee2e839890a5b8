//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: define the strongly typed catalogue, account, and authentication
//! model used by the HTTP and tRPC adapters and by persistence. Types
//! validate on construction; services enforce authorization and translate
//! persistence failures into [`Error`] values.
//!
//! Public surface:
//! - Error, ErrorCode, ValidationIssue: the transport-neutral error model.
//! - User, Role, Principal: identities and what they may do.
//! - catalog: manufacturers, models, and car listings.
//! - ports: driving and driven port traits.
//! - Services implementing the driving ports.

pub mod auth;
pub mod auth_service;
pub mod car_listing_service;
pub mod catalog;
pub mod catalog_service;
pub mod error;
pub mod ports;
pub(crate) mod slug;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::auth::{
    ApiKeyCredential, AuthSession, CredentialValidationError, IssuedApiKey, LoginCredentials,
    PASSWORD_MAX, PASSWORD_MIN, Password, Principal, RefreshClaims, Registration, TokenPair,
};
pub use self::auth_service::AuthService;
pub use self::car_listing_service::CarListingService;
pub use self::catalog_service::{CarModelService, ManufacturerService};
pub use self::error::{Error, ErrorCode, IssueCode, ValidationIssue};
pub use self::trace_id::TraceId;
pub use self::user::{
    PERSON_NAME_MAX, PersonName, ProfileUpdate, Role, USERNAME_MAX, USERNAME_MIN, User,
    UserFilter, UserId, UserValidationError, Username,
};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use carmarket::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
