//! Port for manufacturer persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::catalog::{
    Manufacturer, ManufacturerChanges, ManufacturerFilter, ManufacturerId, NewManufacturer,
};

use super::RepositoryError;

/// Manufacturer storage.
///
/// Unique name or slug collisions surface as [`RepositoryError::Conflict`],
/// as does deleting a manufacturer that still owns models.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManufacturerRepository: Send + Sync {
    /// Page through manufacturers matching `filter`.
    async fn list(
        &self,
        filter: &ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, RepositoryError>;

    /// Fetch one manufacturer.
    async fn find_by_id(&self, id: ManufacturerId)
    -> Result<Option<Manufacturer>, RepositoryError>;

    /// Insert a manufacturer and return the stored row.
    async fn insert(&self, manufacturer: &NewManufacturer)
    -> Result<Manufacturer, RepositoryError>;

    /// Apply `changes`; `None` when the manufacturer does not exist.
    async fn update(
        &self,
        id: ManufacturerId,
        changes: &ManufacturerChanges,
    ) -> Result<Option<Manufacturer>, RepositoryError>;

    /// Delete a manufacturer; `false` when nothing was deleted.
    async fn delete(&self, id: ManufacturerId) -> Result<bool, RepositoryError>;
}
