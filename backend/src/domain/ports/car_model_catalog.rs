//! Driving port for car model use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::catalog::{CarModel, CarModelChanges, CarModelFilter, CarModelId, NewCarModel};
use crate::domain::{Error, Principal};

/// Model browsing (public) and administration (admin only).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarModelCatalog: Send + Sync {
    /// Page through models.
    async fn list(&self, filter: CarModelFilter, page: PageRequest)
    -> Result<Page<CarModel>, Error>;

    /// Fetch one model or fail with not found.
    async fn get(&self, id: CarModelId) -> Result<CarModel, Error>;

    /// Create a model under an existing manufacturer.
    async fn create(&self, principal: &Principal, model: NewCarModel) -> Result<CarModel, Error>;

    /// Update a model.
    async fn update(
        &self,
        principal: &Principal,
        id: CarModelId,
        changes: CarModelChanges,
    ) -> Result<CarModel, Error>;

    /// Delete a model no car refers to.
    async fn delete(&self, principal: &Principal, id: CarModelId) -> Result<(), Error>;
}
