//! Driving port for user account management.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, IssuedApiKey, Principal, ProfileUpdate, Role, User, UserFilter, UserId,
};

/// Account administration and self-service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Page through users (admin only).
    async fn list(
        &self,
        principal: &Principal,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, Error>;

    /// Fetch a user (admin, or the user themself).
    async fn get(&self, principal: &Principal, id: UserId) -> Result<User, Error>;

    /// The caller's own account.
    async fn me(&self, principal: &Principal) -> Result<User, Error>;

    /// Update the caller's own names.
    async fn update_profile(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<User, Error>;

    /// Change another user's role (admin only).
    async fn change_role(&self, principal: &Principal, id: UserId, role: Role)
    -> Result<User, Error>;

    /// Soft-delete an account (admin, or the user themself).
    async fn delete(&self, principal: &Principal, id: UserId) -> Result<(), Error>;

    /// Replace the caller's API key and return the new one.
    async fn issue_api_key(&self, principal: &Principal) -> Result<IssuedApiKey, Error>;
}
