//! Port for user account persistence.
//!
//! Lookups only ever return active accounts; soft-deleted users behave as if
//! they did not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{PersonName, ProfileUpdate, Role, User, UserFilter, UserId, Username};

use super::RepositoryError;

/// User to insert. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub role: Role,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub username: Username,
    pub password_hash: String,
}

/// Active user together with their password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Active user together with the digest of their API key secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredApiKey {
    pub user: User,
    pub secret_digest: String,
}

/// User account storage.
///
/// A duplicate username surfaces as [`RepositoryError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Page through active users matching `filter`, newest first.
    async fn list(&self, filter: &UserFilter, page: PageRequest)
    -> Result<Page<User>, RepositoryError>;

    /// Fetch an active user.
    async fn find_active(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch an active user and password hash by normalised username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, RepositoryError>;

    /// Fetch an active user by the public half of their API key.
    async fn find_by_api_key(&self, key_id: &str)
    -> Result<Option<StoredApiKey>, RepositoryError>;

    /// Insert a user.
    async fn insert(&self, user: &NewUserRecord) -> Result<User, RepositoryError>;

    /// Update names; `None` when the user is not active.
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError>;

    /// Change the role; `None` when the user is not active.
    async fn update_role(&self, id: UserId, role: Role) -> Result<Option<User>, RepositoryError>;

    /// Mark the user deleted at `at` and drop their API key; `false` when no
    /// active user matched.
    async fn soft_delete(&self, id: UserId, at: DateTime<Utc>) -> Result<bool, RepositoryError>;

    /// Replace the user's API key; `false` when the user is not active.
    async fn store_api_key(
        &self,
        id: UserId,
        key_id: &str,
        secret_digest: &str,
    ) -> Result<bool, RepositoryError>;
}
