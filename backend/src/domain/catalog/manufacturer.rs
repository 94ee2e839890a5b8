//! Car manufacturers.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{CatalogName, CatalogValidationError, ManufacturerId, Slug, SortOrder};

/// Stored manufacturer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: CatalogName,
    pub slug: Slug,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Manufacturer {
    /// Compact reference embedded in models and cars.
    #[must_use]
    pub fn summary(&self) -> ManufacturerSummary {
        ManufacturerSummary {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Manufacturer reference embedded in other read models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManufacturerSummary {
    pub id: ManufacturerId,
    pub name: CatalogName,
    pub slug: Slug,
}

/// Manufacturer to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManufacturer {
    pub name: CatalogName,
    pub slug: Slug,
}

impl NewManufacturer {
    /// Build a manufacturer, deriving the slug from the name when absent.
    pub fn new(name: CatalogName, slug: Option<Slug>) -> Result<Self, CatalogValidationError> {
        let slug = Slug::explicit_or_derived(slug, &name)?;
        Ok(Self { name, slug })
    }
}

/// Partial manufacturer update.
///
/// Renaming does not re-derive the slug; published URLs stay stable unless a
/// new slug is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManufacturerChanges {
    name: Option<CatalogName>,
    slug: Option<Slug>,
}

impl ManufacturerChanges {
    /// Build an update; at least one field must change.
    pub fn new(
        name: Option<CatalogName>,
        slug: Option<Slug>,
    ) -> Result<Self, CatalogValidationError> {
        if name.is_none() && slug.is_none() {
            return Err(CatalogValidationError::EmptyUpdate);
        }
        Ok(Self { name, slug })
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
}

/// Manufacturer listing sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ManufacturerSort {
    #[default]
    Name,
    CreatedAt,
}

impl ManufacturerSort {
    /// Accepted wire values.
    pub const OPTIONS: &'static [&'static str] = &["name", "createdAt"];
}

impl FromStr for ManufacturerSort {
    type Err = CatalogValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "createdAt" => Ok(Self::CreatedAt),
            other => Err(CatalogValidationError::UnknownOption {
                value: other.to_owned(),
                options: Self::OPTIONS,
            }),
        }
    }
}

/// Manufacturer listing criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManufacturerFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    pub sort: ManufacturerSort,
    pub order: SortOrder,
}
