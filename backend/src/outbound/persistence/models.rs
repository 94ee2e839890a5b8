//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::catalog::{
    Car, CarId, CarModel, CarModelId, CarModelSummary, CatalogName, Color, Kilometres,
    Manufacturer, ManufacturerId, ManufacturerSummary, ModelYear, Price, Slug,
};
use crate::domain::ports::RepositoryError;
use crate::domain::{PersonName, Role, User, UserId, Username};

use super::schema::{car_manufacturers, car_models, cars, user_favorite_cars, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub role: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Changeset for profile edits; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileUpdate<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Row struct for reading from the car_manufacturers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = car_manufacturers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ManufacturerRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = car_manufacturers)]
pub(crate) struct NewManufacturerRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = car_manufacturers)]
pub(crate) struct ManufacturerUpdate<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
}

/// Row struct for reading from the car_models table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = car_models)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarModelRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = car_models)]
pub(crate) struct NewCarModelRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub manufacturer_id: Uuid,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = car_models)]
pub(crate) struct CarModelUpdate<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub manufacturer_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

/// Row struct for reading from the cars table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cars)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CarRow {
    pub id: Uuid,
    pub year: i32,
    pub color: String,
    pub km_driven: i32,
    pub price: i64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cars)]
pub(crate) struct NewCarRow<'a> {
    pub id: Uuid,
    pub year: i32,
    pub color: &'a str,
    pub km_driven: i32,
    pub price: i64,
    pub model_id: Uuid,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = cars)]
pub(crate) struct CarUpdate<'a> {
    pub year: Option<i32>,
    pub color: Option<&'a str>,
    pub km_driven: Option<i32>,
    pub price: Option<i64>,
    pub model_id: Option<Uuid>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_favorite_cars)]
pub(crate) struct NewFavoriteRow {
    pub user_id: Uuid,
    pub car_id: Uuid,
}

// ---------------------------------------------------------------------------
// Row-to-domain converters
// ---------------------------------------------------------------------------

/// Stored values that fail domain validation mean the schema and the domain
/// rules have drifted apart.
fn corrupted(field: &str, error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("invalid {field} in database: {error}"))
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, RepositoryError> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            role: Role::from_str(&self.role).map_err(|err| corrupted("users.role", err))?,
            first_name: PersonName::new(&self.first_name)
                .map_err(|err| corrupted("users.first_name", err))?,
            last_name: PersonName::new(&self.last_name)
                .map_err(|err| corrupted("users.last_name", err))?,
            username: Username::new(&self.username)
                .map_err(|err| corrupted("users.username", err))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn catalog_name(field: &str, raw: &str) -> Result<CatalogName, RepositoryError> {
    CatalogName::new(raw).map_err(|err| corrupted(field, err))
}

fn slug(field: &str, raw: &str) -> Result<Slug, RepositoryError> {
    Slug::new(raw).map_err(|err| corrupted(field, err))
}

impl ManufacturerRow {
    pub(crate) fn into_domain(self) -> Result<Manufacturer, RepositoryError> {
        Ok(Manufacturer {
            id: ManufacturerId::from_uuid(self.id),
            name: catalog_name("car_manufacturers.name", &self.name)?,
            slug: slug("car_manufacturers.slug", &self.slug)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    pub(crate) fn into_summary(self) -> Result<ManufacturerSummary, RepositoryError> {
        self.into_domain().map(|manufacturer| manufacturer.summary())
    }
}

impl CarModelRow {
    pub(crate) fn into_domain(
        self,
        manufacturer: ManufacturerRow,
    ) -> Result<CarModel, RepositoryError> {
        Ok(CarModel {
            id: CarModelId::from_uuid(self.id),
            name: catalog_name("car_models.name", &self.name)?,
            slug: slug("car_models.slug", &self.slug)?,
            manufacturer: manufacturer.into_summary()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CarRow {
    pub(crate) fn into_domain(
        self,
        model: CarModelRow,
        manufacturer: ManufacturerRow,
    ) -> Result<Car, RepositoryError> {
        Ok(Car {
            id: CarId::from_uuid(self.id),
            year: ModelYear::from_stored(self.year),
            color: Color::new(&self.color).map_err(|err| corrupted("cars.color", err))?,
            km_driven: Kilometres::new(self.km_driven)
                .map_err(|err| corrupted("cars.km_driven", err))?,
            price: Price::new(self.price).map_err(|err| corrupted("cars.price", err))?,
            model: CarModelSummary {
                id: CarModelId::from_uuid(model.id),
                name: catalog_name("car_models.name", &model.name)?,
                slug: slug("car_models.slug", &model.slug)?,
                manufacturer: manufacturer.into_summary()?,
            },
            created_by: UserId::from_uuid(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
