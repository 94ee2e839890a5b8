//! Car models belonging to a manufacturer.

use chrono::{DateTime, Utc};

use super::{
    CarModelId, CatalogName, CatalogValidationError, ManufacturerId, ManufacturerSummary, Slug,
};

/// Stored model together with its manufacturer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarModel {
    pub id: CarModelId,
    pub name: CatalogName,
    pub slug: Slug,
    pub manufacturer: ManufacturerSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Model to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCarModel {
    pub name: CatalogName,
    pub slug: Slug,
    pub manufacturer_id: ManufacturerId,
}

impl NewCarModel {
    /// Build a model, deriving the slug from the name when absent.
    pub fn new(
        name: CatalogName,
        slug: Option<Slug>,
        manufacturer_id: ManufacturerId,
    ) -> Result<Self, CatalogValidationError> {
        let slug = Slug::explicit_or_derived(slug, &name)?;
        Ok(Self {
            name,
            slug,
            manufacturer_id,
        })
    }
}

/// Partial model update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarModelChanges {
    name: Option<CatalogName>,
    slug: Option<Slug>,
    manufacturer_id: Option<ManufacturerId>,
}

impl CarModelChanges {
    /// Build an update; at least one field must change.
    pub fn new(
        name: Option<CatalogName>,
        slug: Option<Slug>,
        manufacturer_id: Option<ManufacturerId>,
    ) -> Result<Self, CatalogValidationError> {
        if name.is_none() && slug.is_none() && manufacturer_id.is_none() {
            return Err(CatalogValidationError::EmptyUpdate);
        }
        Ok(Self {
            name,
            slug,
            manufacturer_id,
        })
    }

    /// New name, if changing.
    #[must_use]
    pub const fn name(&self) -> Option<&CatalogName> {
        self.name.as_ref()
    }

    /// New slug, if changing.
    #[must_use]
    pub const fn slug(&self) -> Option<&Slug> {
        self.slug.as_ref()
    }

    /// New owning manufacturer, if changing.
    #[must_use]
    pub const fn manufacturer_id(&self) -> Option<ManufacturerId> {
        self.manufacturer_id
    }
}

/// Model listing criteria. Results are ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarModelFilter {
    pub manufacturer_id: Option<ManufacturerId>,
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
}
