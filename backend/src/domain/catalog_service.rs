//! Manufacturer and model services implementing the catalogue driving ports.
//!
//! Reads are public; every mutation requires an administrator. Uniqueness
//! and referential rules are left to the database and arrive here already
//! translated by the repository adapter.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::catalog::{
    CarModel, CarModelChanges, CarModelFilter, CarModelId, Manufacturer, ManufacturerChanges,
    ManufacturerFilter, ManufacturerId, NewCarModel, NewManufacturer,
};
use crate::domain::ports::{
    CarModelCatalog, CarModelRepository, ManufacturerCatalog, ManufacturerRepository,
};
use crate::domain::{Error, Principal};

fn manufacturer_not_found(id: ManufacturerId) -> Error {
    Error::not_found(format!("manufacturer {id} not found"))
}

fn model_not_found(id: CarModelId) -> Error {
    Error::not_found(format!("car model {id} not found"))
}

/// Manufacturer service.
#[derive(Clone)]
pub struct ManufacturerService<R> {
    repo: Arc<R>,
}

impl<R> ManufacturerService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> ManufacturerCatalog for ManufacturerService<R>
where
    R: ManufacturerRepository,
{
    async fn list(
        &self,
        filter: ManufacturerFilter,
        page: PageRequest,
    ) -> Result<Page<Manufacturer>, Error> {
        Ok(self.repo.list(&filter, page).await?)
    }

    async fn get(&self, id: ManufacturerId) -> Result<Manufacturer, Error> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| manufacturer_not_found(id))
    }

    async fn create(
        &self,
        principal: &Principal,
        manufacturer: NewManufacturer,
    ) -> Result<Manufacturer, Error> {
        principal.require_admin()?;
        let created = self.repo.insert(&manufacturer).await?;
        info!(manufacturer_id = %created.id, slug = %created.slug, "manufacturer created");
        Ok(created)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: ManufacturerId,
        changes: ManufacturerChanges,
    ) -> Result<Manufacturer, Error> {
        principal.require_admin()?;
        let updated = self
            .repo
            .update(id, &changes)
            .await?
            .ok_or_else(|| manufacturer_not_found(id))?;
        info!(manufacturer_id = %id, "manufacturer updated");
        Ok(updated)
    }

    async fn delete(&self, principal: &Principal, id: ManufacturerId) -> Result<(), Error> {
        principal.require_admin()?;
        if !self.repo.delete(id).await? {
            return Err(manufacturer_not_found(id));
        }
        info!(manufacturer_id = %id, "manufacturer deleted");
        Ok(())
    }
}

/// Car model service.
#[derive(Clone)]
pub struct CarModelService<R> {
    repo: Arc<R>,
}

impl<R> CarModelService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> CarModelCatalog for CarModelService<R>
where
    R: CarModelRepository,
{
    async fn list(
        &self,
        filter: CarModelFilter,
        page: PageRequest,
    ) -> Result<Page<CarModel>, Error> {
        Ok(self.repo.list(&filter, page).await?)
    }

    async fn get(&self, id: CarModelId) -> Result<CarModel, Error> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| model_not_found(id))
    }

    async fn create(&self, principal: &Principal, model: NewCarModel) -> Result<CarModel, Error> {
        principal.require_admin()?;
        let created = self.repo.insert(&model).await?;
        info!(
            model_id = %created.id,
            manufacturer_id = %created.manufacturer.id,
            "car model created"
        );
        Ok(created)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: CarModelId,
        changes: CarModelChanges,
    ) -> Result<CarModel, Error> {
        principal.require_admin()?;
        let updated = self
            .repo
            .update(id, &changes)
            .await?
            .ok_or_else(|| model_not_found(id))?;
        info!(model_id = %id, "car model updated");
        Ok(updated)
    }

    async fn delete(&self, principal: &Principal, id: CarModelId) -> Result<(), Error> {
        principal.require_admin()?;
        if !self.repo.delete(id).await? {
            return Err(model_not_found(id));
        }
        info!(model_id = %id, "car model deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
