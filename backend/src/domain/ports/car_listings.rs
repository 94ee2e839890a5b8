//! Driving port for car listing and favourite use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::catalog::{Car, CarChanges, CarFilter, CarId, NewCar};
use crate::domain::{Error, Principal};

/// Car browsing, listing management, and favourites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarListings: Send + Sync {
    /// Page through active cars.
    async fn list(&self, filter: CarFilter, page: PageRequest) -> Result<Page<Car>, Error>;

    /// Fetch an active car or fail with not found.
    async fn get(&self, id: CarId) -> Result<Car, Error>;

    /// List a car owned by the caller.
    async fn create(&self, principal: &Principal, car: NewCar) -> Result<Car, Error>;

    /// Update a car the caller owns (admins may update any car).
    async fn update(
        &self,
        principal: &Principal,
        id: CarId,
        changes: CarChanges,
    ) -> Result<Car, Error>;

    /// Soft-delete a car the caller owns (admins may delete any car).
    async fn delete(&self, principal: &Principal, id: CarId) -> Result<(), Error>;

    /// Favourite an active car. Idempotent.
    async fn add_favorite(&self, principal: &Principal, id: CarId) -> Result<(), Error>;

    /// Unfavourite a car. Idempotent.
    async fn remove_favorite(&self, principal: &Principal, id: CarId) -> Result<(), Error>;

    /// Page through the caller's favourites.
    async fn favorites(&self, principal: &Principal, page: PageRequest)
    -> Result<Page<Car>, Error>;
}
