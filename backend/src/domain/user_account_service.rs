//! User account service implementing [`UserAccounts`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use crate::domain::ports::{ApiKeyMinter, UserAccounts, UserRepository};
use crate::domain::{
    Error, IssuedApiKey, Principal, ProfileUpdate, Role, User, UserFilter, UserId,
};

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// User account service.
#[derive(Clone)]
pub struct UserAccountService<R, K> {
    repo: Arc<R>,
    keys: Arc<K>,
    clock: Arc<dyn Clock>,
}

impl<R, K> UserAccountService<R, K> {
    /// Create a service over the user repository and API key minter.
    pub fn new(repo: Arc<R>, keys: Arc<K>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, keys, clock }
    }
}

#[async_trait]
impl<R, K> UserAccounts for UserAccountService<R, K>
where
    R: UserRepository,
    K: ApiKeyMinter,
{
    async fn list(
        &self,
        principal: &Principal,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, Error> {
        principal.require_admin()?;
        Ok(self.repo.list(&filter, page).await?)
    }

    async fn get(&self, principal: &Principal, id: UserId) -> Result<User, Error> {
        principal.require_owner_or_admin(id)?;
        self.repo
            .find_active(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    async fn me(&self, principal: &Principal) -> Result<User, Error> {
        let id = principal.user_id();
        self.repo
            .find_active(id)
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))
    }

    async fn update_profile(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let id = principal.user_id();
        let user = self
            .repo
            .update_profile(id, &update)
            .await?
            .ok_or_else(|| Error::unauthorized("account no longer exists"))?;
        info!(user_id = %id, "profile updated");
        Ok(user)
    }

    async fn change_role(
        &self,
        principal: &Principal,
        id: UserId,
        role: Role,
    ) -> Result<User, Error> {
        principal.require_admin()?;
        if principal.user_id() == id {
            warn!(user_id = %id, "administrator attempted to change own role");
            return Err(Error::forbidden("administrators cannot change their own role"));
        }
        let user = self
            .repo
            .update_role(id, role)
            .await?
            .ok_or_else(|| user_not_found(id))?;
        info!(user_id = %id, %role, actor = %principal.user_id(), "role changed");
        Ok(user)
    }

    async fn delete(&self, principal: &Principal, id: UserId) -> Result<(), Error> {
        principal.require_owner_or_admin(id)?;
        if !self.repo.soft_delete(id, self.clock.utc()).await? {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, actor = %principal.user_id(), "user deleted");
        Ok(())
    }

    async fn issue_api_key(&self, principal: &Principal) -> Result<IssuedApiKey, Error> {
        let id = principal.user_id();
        let issued = self.keys.mint();
        let stored = self
            .repo
            .store_api_key(id, &issued.key_id, &issued.secret_digest)
            .await?;
        if !stored {
            return Err(Error::unauthorized("account no longer exists"));
        }
        info!(user_id = %id, key_id = %issued.key_id, "api key issued");
        Ok(issued)
    }
}

#[cfg(test)]
#[path = "user_account_service_tests.rs"]
mod tests;
