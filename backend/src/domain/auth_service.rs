//! Authentication service implementing [`Authenticator`].
//!
//! Every credential check re-reads the account so soft-deleted users lose
//! access immediately and role changes apply on the next request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    ApiKeyMinter, Authenticator, NewUserRecord, PasswordHashError, PasswordHasher, TokenError,
    TokenService, UserRepository,
};
use crate::domain::{
    ApiKeyCredential, AuthSession, Error, LoginCredentials, Principal, Registration, Role, User,
};

const INVALID_CREDENTIALS: &str = "invalid username or password";

fn map_token_error(error: TokenError) -> Error {
    match error {
        TokenError::Expired => Error::unauthorized("token expired"),
        TokenError::Invalid { message } => {
            warn!(%message, "token rejected");
            Error::unauthorized("invalid token")
        }
        TokenError::Signing { message } => Error::internal(format!("token signing failed: {message}")),
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService<U, H, T, K> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    keys: Arc<K>,
}

impl<U, H, T, K> AuthService<U, H, T, K> {
    /// Create a service from its driven ports.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, keys: Arc<K>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            keys,
        }
    }
}

impl<U, H, T, K> AuthService<U, H, T, K>
where
    U: UserRepository,
    T: TokenService,
{
    fn start_session(&self, user: User) -> Result<AuthSession, Error> {
        let tokens = self
            .tokens
            .issue(&Principal::from(&user))
            .map_err(map_token_error)?;
        Ok(AuthSession { user, tokens })
    }

    async fn active_principal(&self, principal: Principal) -> Result<Principal, Error> {
        self.users
            .find_active(principal.user_id())
            .await?
            .map(|user| Principal::from(&user))
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }
}

#[async_trait]
impl<U, H, T, K> Authenticator for AuthService<U, H, T, K>
where
    U: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    K: ApiKeyMinter,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(&registration.password)
            .await
            .map_err(map_hash_error)?;
        let record = NewUserRecord {
            role: Role::User,
            first_name: registration.first_name,
            last_name: registration.last_name,
            username: registration.username,
            password_hash,
        };
        let user = self.users.insert(&record).await?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(stored) = self.users.find_credentials(credentials.username()).await? else {
            self.hasher
                .verify(credentials.password(), self.hasher.decoy_hash())
                .await
                .map_err(map_hash_error)?;
            warn!(username = credentials.username(), "login for unknown user");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            warn!(user_id = %stored.user.id, "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %stored.user.id, "user logged in");
        self.start_session(stored.user)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, Error> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(map_token_error)?;
        let user = self
            .users
            .find_active(claims.user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        self.start_session(user)
    }

    async fn authenticate_bearer(&self, access_token: &str) -> Result<Principal, Error> {
        let principal = self
            .tokens
            .verify_access(access_token)
            .map_err(map_token_error)?;
        self.active_principal(principal).await
    }

    async fn authenticate_api_key(
        &self,
        credential: &ApiKeyCredential,
    ) -> Result<Principal, Error> {
        let Some(stored) = self.users.find_by_api_key(credential.key_id()).await? else {
            warn!(key_id = credential.key_id(), "unknown api key");
            return Err(Error::unauthorized("invalid API key"));
        };
        if !self.keys.verify(credential.secret(), &stored.secret_digest) {
            warn!(key_id = credential.key_id(), "api key secret mismatch");
            return Err(Error::unauthorized("invalid API key"));
        }
        Ok(Principal::from(&stored.user))
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
