//! Driving port for manufacturer use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::catalog::{
    Manufacturer, ManufacturerChanges, ManufacturerFilter, ManufacturerId, NewManufacturer,
};
use crate::domain::{Error, Principal};

/// Manufacturer browsing (public) and administration (admin only).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManufacturerCatalog: Send + Sync {
    /// Page through manufacturers.
    async fn list(
        &self,
        filter: ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, Error>;

    /// Fetch one manufacturer or fail with not found.
    async fn get(&self, id: ManufacturerId) -> Result<Manufacturer, Error>;

    /// Create a manufacturer.
    async fn create(
        &self,
        principal: &Principal,
        manufacturer: NewManufacturer,
    ) -> Result<Manufacturer, Error>;

    /// Update a manufacturer.
    async fn update(
        &self,
        principal: &Principal,
        id: ManufacturerId,
        changes: ManufacturerChanges,
    ) -> Result<Manufacturer, Error>;

    /// Delete a manufacturer that no longer has models.
    async fn delete(&self, principal: &Principal, id: ManufacturerId) -> Result<(), Error>;
}
