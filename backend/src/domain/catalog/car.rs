//! Cars listed for sale.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};

use super::{
    CarId, CarModelId, CatalogName, CatalogValidationError, ManufacturerId, ManufacturerSummary,
    Slug, SortOrder,
};
use crate::domain::user::UserId;

/// Earliest model year accepted.
pub const MIN_MODEL_YEAR: i32 = 1886;
/// Maximum length of a colour.
pub const COLOR_MAX: usize = 32;
/// Largest odometer reading accepted.
pub const KM_MAX: i32 = 2_000_000;
/// Largest price accepted, in whole currency units.
pub const PRICE_MAX: i64 = 100_000_000;

/// Model year, from [`MIN_MODEL_YEAR`] up to next calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModelYear(i32);

impl ModelYear {
    /// Validate against today's date.
    pub fn new(value: i32) -> Result<Self, CatalogValidationError> {
        Self::new_as_of(value, Utc::now())
    }

    /// Validate against `today`; next year's models are already on sale.
    pub fn new_as_of(value: i32, today: DateTime<Utc>) -> Result<Self, CatalogValidationError> {
        let max = today.year().saturating_add(1);
        if (MIN_MODEL_YEAR..=max).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CatalogValidationError::YearOutOfRange {
                min: MIN_MODEL_YEAR,
                max,
            })
        }
    }

    /// Rehydrate a stored year without re-checking the upper bound, which
    /// moves with the calendar.
    #[must_use]
    pub const fn from_stored(value: i32) -> Self {
        Self(value)
    }

    /// Year as an integer.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Exterior colour, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color(String);

impl Color {
    /// Trim and validate a colour.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CatalogValidationError::EmptyColor);
        }
        if trimmed.chars().count() > COLOR_MAX {
            return Err(CatalogValidationError::ColorTooLong { max: COLOR_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Odometer reading in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Kilometres(i32);

impl Kilometres {
    /// Validate an odometer reading.
    pub const fn new(value: i32) -> Result<Self, CatalogValidationError> {
        if value >= 0 && value <= KM_MAX {
            Ok(Self(value))
        } else {
            Err(CatalogValidationError::KilometresOutOfRange { max: KM_MAX })
        }
    }

    /// Reading as an integer.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Asking price in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i64);

impl Price {
    /// Validate a price.
    pub const fn new(value: i64) -> Result<Self, CatalogValidationError> {
        if value >= 0 && value <= PRICE_MAX {
            Ok(Self(value))
        } else {
            Err(CatalogValidationError::PriceOutOfRange { max: PRICE_MAX })
        }
    }

    /// Price as an integer.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Model reference embedded in a car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarModelSummary {
    pub id: CarModelId,
    pub name: CatalogName,
    pub slug: Slug,
    pub manufacturer: ManufacturerSummary,
}

/// Active car listing with its model and manufacturer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub id: CarId,
    pub year: ModelYear,
    pub color: Color,
    pub km_driven: Kilometres,
    pub price: Price,
    pub model: CarModelSummary,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Car to list. The owner comes from the authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
    pub year: ModelYear,
    pub color: Color,
    pub km_driven: Kilometres,
    pub price: Price,
    pub model_id: CarModelId,
}

/// Partial car update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarChanges {
    pub year: Option<ModelYear>,
    pub color: Option<Color>,
    pub km_driven: Option<Kilometres>,
    pub price: Option<Price>,
    pub model_id: Option<CarModelId>,
}

impl CarChanges {
    /// Reject updates that change nothing.
    pub fn ensure_not_empty(self) -> Result<Self, CatalogValidationError> {
        if self == Self::default() {
            Err(CatalogValidationError::EmptyUpdate)
        } else {
            Ok(self)
        }
    }
}

/// Car listing sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CarSort {
    Price,
    Year,
    KmDriven,
    #[default]
    CreatedAt,
}

impl CarSort {
    /// Accepted wire values.
    pub const OPTIONS: &'static [&'static str] = &["price", "year", "kmDriven", "createdAt"];
}

impl FromStr for CarSort {
    type Err = CatalogValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(Self::Price),
            "year" => Ok(Self::Year),
            "kmDriven" => Ok(Self::KmDriven),
            "createdAt" => Ok(Self::CreatedAt),
            other => Err(CatalogValidationError::UnknownOption {
                value: other.to_owned(),
                options: Self::OPTIONS,
            }),
        }
    }
}

/// Car listing criteria. Soft-deleted cars never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFilter {
    pub manufacturer_id: Option<ManufacturerId>,
    pub model_id: Option<CarModelId>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    /// Case-insensitive exact colour.
    pub color: Option<String>,
    pub sort: CarSort,
    pub order: SortOrder,
}

impl CarFilter {
    /// Reject ranges whose lower bound exceeds the upper bound.
    pub fn validate(self) -> Result<Self, CatalogValidationError> {
        if matches!((self.year_from, self.year_to), (Some(from), Some(to)) if from > to) {
            return Err(CatalogValidationError::InvertedRange {
                from: "yearFrom",
                to: "yearTo",
            });
        }
        if matches!((self.price_min, self.price_max), (Some(min), Some(max)) if min > max) {
            return Err(CatalogValidationError::InvertedRange {
                from: "priceMin",
                to: "priceMax",
            });
        }
        Ok(self)
    }
}
