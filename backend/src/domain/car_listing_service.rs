//! Car listing service implementing [`CarListings`].
//!
//! Anyone may browse. Listing a car needs an authenticated caller, and only
//! the owner or an administrator may change or withdraw it.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::catalog::{Car, CarChanges, CarFilter, CarId, NewCar};
use crate::domain::ports::{CarListings, CarRepository};
use crate::domain::{Error, Principal};

fn car_not_found(id: CarId) -> Error {
    Error::not_found(format!("car {id} not found"))
}

/// Car listing service.
#[derive(Clone)]
pub struct CarListingService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CarListingService<R> {
    /// Create a service over `repo`, stamping soft deletes with `clock`.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R> CarListingService<R>
where
    R: CarRepository,
{
    async fn owned_car(&self, principal: &Principal, id: CarId) -> Result<Car, Error> {
        let car = self
            .repo
            .find_active(id)
            .await?
            .ok_or_else(|| car_not_found(id))?;
        principal.require_owner_or_admin(car.created_by)?;
        Ok(car)
    }
}

#[async_trait]
impl<R> CarListings for CarListingService<R>
where
    R: CarRepository,
{
    async fn list(&self, filter: CarFilter, page: PageRequest) -> Result<Page<Car>, Error> {
        let filter = filter
            .validate()
            .map_err(|err| Error::validation([err.to_issue()]))?;
        Ok(self.repo.list(&filter, page).await?)
    }

    async fn get(&self, id: CarId) -> Result<Car, Error> {
        self.repo
            .find_active(id)
            .await?
            .ok_or_else(|| car_not_found(id))
    }

    async fn create(&self, principal: &Principal, car: NewCar) -> Result<Car, Error> {
        let created = self.repo.insert(&car, principal.user_id()).await?;
        info!(car_id = %created.id, owner = %principal.user_id(), "car listed");
        Ok(created)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: CarId,
        changes: CarChanges,
    ) -> Result<Car, Error> {
        self.owned_car(principal, id).await?;
        let updated = self
            .repo
            .update(id, &changes)
            .await?
            .ok_or_else(|| car_not_found(id))?;
        info!(car_id = %id, actor = %principal.user_id(), "car updated");
        Ok(updated)
    }

    async fn delete(&self, principal: &Principal, id: CarId) -> Result<(), Error> {
        self.owned_car(principal, id).await?;
        if !self.repo.soft_delete(id, self.clock.utc()).await? {
            return Err(car_not_found(id));
        }
        info!(car_id = %id, actor = %principal.user_id(), "car withdrawn");
        Ok(())
    }

    async fn add_favorite(&self, principal: &Principal, id: CarId) -> Result<(), Error> {
        if self.repo.find_active(id).await?.is_none() {
            return Err(car_not_found(id));
        }
        self.repo.add_favorite(principal.user_id(), id).await?;
        Ok(())
    }

    async fn remove_favorite(&self, principal: &Principal, id: CarId) -> Result<(), Error> {
        self.repo.remove_favorite(principal.user_id(), id).await?;
        Ok(())
    }

    async fn favorites(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<Car>, Error> {
        Ok(self.repo.list_favorites(principal.user_id(), page).await?)
    }
}

#[cfg(test)]
#[path = "car_listing_service_tests.rs"]
mod tests;
