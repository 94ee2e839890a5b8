//! Port for car listings and favourites.
//!
//! Soft-deleted cars are invisible through every method except
//! [`CarRepository::soft_delete`], which reports whether an active row was
//! marked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::UserId;
use crate::domain::catalog::{Car, CarChanges, CarFilter, CarId, NewCar};

use super::RepositoryError;

/// Car listing storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// Page through active cars matching `filter`.
    async fn list(&self, filter: &CarFilter, page: PageRequest)
    -> Result<Page<Car>, RepositoryError>;

    /// Fetch an active car.
    async fn find_active(&self, id: CarId) -> Result<Option<Car>, RepositoryError>;

    /// Insert a car owned by `owner`.
    async fn insert(&self, car: &NewCar, owner: UserId) -> Result<Car, RepositoryError>;

    /// Apply `changes` to an active car; `None` when it does not exist.
    async fn update(&self, id: CarId, changes: &CarChanges)
    -> Result<Option<Car>, RepositoryError>;

    /// Mark an active car deleted at `at`; `false` when none matched.
    async fn soft_delete(&self, id: CarId, at: DateTime<Utc>) -> Result<bool, RepositoryError>;

    /// Record a favourite. Repeating the call is a no-op.
    async fn add_favorite(&self, user: UserId, car: CarId) -> Result<(), RepositoryError>;

    /// Forget a favourite. Removing an absent favourite is a no-op.
    async fn remove_favorite(&self, user: UserId, car: CarId) -> Result<(), RepositoryError>;

    /// Page through `user`'s active favourites, most recent first.
    async fn list_favorites(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<Car>, RepositoryError>;
}
