//! Driving port for sign-up, sign-in, and request authentication.
//!
//! Inbound adapters call this to turn credentials into a [`Principal`]
//! without knowing how tokens are signed or passwords stored.

use async_trait::async_trait;

use crate::domain::{
    ApiKeyCredential, AuthSession, Error, LoginCredentials, Principal, Registration, User,
};

/// Authentication use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Create a regular user account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Check credentials and mint tokens.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, Error>;

    /// Resolve a bearer access token to the active account behind it.
    async fn authenticate_bearer(&self, access_token: &str) -> Result<Principal, Error>;

    /// Resolve an API key to the active account behind it.
    async fn authenticate_api_key(&self, credential: &ApiKeyCredential)
    -> Result<Principal, Error>;
}
