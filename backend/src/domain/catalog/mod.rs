//! Car catalogue: manufacturers, their models, and cars listed for sale.
//!
//! Value types validate on construction so repositories and services can
//! assume well-formed input. Each `to_issue` method turns a validation error
//! into the structured issue the inbound adapters report.

mod car;
mod car_model;
mod manufacturer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{IssueCode, ValidationIssue};
use super::slug::{SLUG_MAX, is_valid_slug, slugify};

pub use car::{
    COLOR_MAX, Car, CarChanges, CarFilter, CarModelSummary, CarSort, Color, KM_MAX, Kilometres,
    MIN_MODEL_YEAR, ModelYear, NewCar, PRICE_MAX, Price,
};
pub use car_model::{CarModel, CarModelChanges, CarModelFilter, NewCarModel};
pub use manufacturer::{
    Manufacturer, ManufacturerChanges, ManufacturerFilter, ManufacturerSort, ManufacturerSummary,
    NewManufacturer,
};

/// Maximum length of a manufacturer or model name.
pub const CATALOG_NAME_MAX: usize = 64;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Parse an identifier from text.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
                uuid::Uuid::parse_str(raw.as_ref())
                    .map(Self)
                    .map_err(|_| CatalogValidationError::InvalidId)
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Manufacturer identifier.
    ManufacturerId
);
uuid_id!(
    /// Car model identifier.
    CarModelId
);
uuid_id!(
    /// Car listing identifier.
    CarId
);

/// Validation errors raised by catalogue value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogValidationError {
    InvalidId,
    EmptyName,
    NameTooLong { max: usize },
    InvalidSlug,
    SlugUnderivable,
    YearOutOfRange { min: i32, max: i32 },
    EmptyColor,
    ColorTooLong { max: usize },
    KilometresOutOfRange { max: i32 },
    PriceOutOfRange { max: i64 },
    EmptyUpdate,
    InvertedRange { from: &'static str, to: &'static str },
    UnknownOption { value: String, options: &'static [&'static str] },
}

impl fmt::Display for CatalogValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "identifier must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidSlug => write!(
                f,
                "slug must be 1-{SLUG_MAX} lowercase letters, digits, or hyphens"
            ),
            Self::SlugUnderivable => write!(
                f,
                "slug cannot be derived from this name; provide one explicitly"
            ),
            Self::YearOutOfRange { min, max } => {
                write!(f, "year must be between {min} and {max}")
            }
            Self::EmptyColor => write!(f, "color must not be empty"),
            Self::ColorTooLong { max } => write!(f, "color must be at most {max} characters"),
            Self::KilometresOutOfRange { max } => {
                write!(f, "kilometres driven must be between 0 and {max}")
            }
            Self::PriceOutOfRange { max } => write!(f, "price must be between 0 and {max}"),
            Self::EmptyUpdate => write!(f, "at least one field must be provided"),
            Self::InvertedRange { from, to } => {
                write!(f, "{from} must not be greater than {to}")
            }
            Self::UnknownOption { value, options } => {
                write!(f, "'{value}' is not one of: {}", options.join(", "))
            }
        }
    }
}

impl std::error::Error for CatalogValidationError {}

impl CatalogValidationError {
    /// Structured issue describing this failure; adapters add the path.
    #[must_use]
    pub fn to_issue(&self) -> ValidationIssue {
        let code = match self {
            Self::InvalidId | Self::InvalidSlug => IssueCode::InvalidString,
            Self::EmptyName | Self::EmptyColor => IssueCode::TooSmall,
            Self::NameTooLong { .. } | Self::ColorTooLong { .. } => IssueCode::TooBig,
            Self::YearOutOfRange { .. }
            | Self::KilometresOutOfRange { .. }
            | Self::PriceOutOfRange { .. } => IssueCode::TooBig,
            Self::UnknownOption { .. } => IssueCode::InvalidEnumValue,
            Self::SlugUnderivable | Self::EmptyUpdate | Self::InvertedRange { .. } => {
                IssueCode::Custom
            }
        };
        let issue = ValidationIssue::new(code, self.to_string());
        match self {
            Self::UnknownOption { value, options } => issue
                .with_received(serde_json::Value::String(value.clone()))
                .with_options(options.iter().copied()),
            _ => issue,
        }
    }
}

/// Manufacturer or model display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CatalogName(String);

impl CatalogName {
    /// Trim and validate a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CatalogValidationError::EmptyName);
        }
        if trimmed.chars().count() > CATALOG_NAME_MAX {
            return Err(CatalogValidationError::NameTooLong {
                max: CATALOG_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CatalogName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CatalogName> for String {
    fn from(value: CatalogName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CatalogName {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// URL slug for a manufacturer or model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate an explicit slug after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CatalogValidationError> {
        let trimmed = raw.as_ref().trim();
        if is_valid_slug(trimmed) {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(CatalogValidationError::InvalidSlug)
        }
    }

    /// Derive a slug from `name`.
    pub fn derive_from(name: &CatalogName) -> Result<Self, CatalogValidationError> {
        let derived = slugify(name.as_ref());
        if derived.is_empty() {
            return Err(CatalogValidationError::SlugUnderivable);
        }
        Ok(Self(derived))
    }

    /// Use `explicit` when given, otherwise derive from `name`.
    pub fn explicit_or_derived(
        explicit: Option<Self>,
        name: &CatalogName,
    ) -> Result<Self, CatalogValidationError> {
        explicit.map_or_else(|| Self::derive_from(name), Ok)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = CatalogValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Listing sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Accepted wire values.
    pub const OPTIONS: &'static [&'static str] = &["asc", "desc"];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CatalogValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(CatalogValidationError::UnknownOption {
                value: other.to_owned(),
                options: Self::OPTIONS,
            }),
        }
    }
}

/// Normalise a free-text search term: trimmed, `None` when blank.
#[must_use]
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_owned)
}
