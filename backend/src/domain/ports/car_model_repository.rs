//! Port for car model persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::catalog::{CarModel, CarModelChanges, CarModelFilter, CarModelId, NewCarModel};

use super::RepositoryError;

/// Car model storage. Every returned model carries its manufacturer.
///
/// Referencing an unknown manufacturer surfaces as
/// [`RepositoryError::MissingReference`]; deleting a model that cars still
/// use surfaces as [`RepositoryError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarModelRepository: Send + Sync {
    /// Page through models matching `filter`, ordered by name.
    async fn list(
        &self,
        filter: &CarModelFilter,
        page: PageRequest,
    ) -> Result<Page<CarModel>, RepositoryError>;

    /// Fetch one model.
    async fn find_by_id(&self, id: CarModelId) -> Result<Option<CarModel>, RepositoryError>;

    /// Insert a model and return it with its manufacturer.
    async fn insert(&self, model: &NewCarModel) -> Result<CarModel, RepositoryError>;

    /// Apply `changes`; `None` when the model does not exist.
    async fn update(
        &self,
        id: CarModelId,
        changes: &CarModelChanges,
    ) -> Result<Option<CarModel>, RepositoryError>;

    /// Delete a model; `false` when nothing was deleted.
    async fn delete(&self, id: CarModelId) -> Result<bool, RepositoryError>;
}
