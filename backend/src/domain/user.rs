//! User accounts: identifiers, roles, and validated profile fields.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{IssueCode, ValidationIssue};

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;
/// Maximum allowed length for a first or last name.
pub const PERSON_NAME_MAX: usize = 64;

/// Validation errors raised by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    UnknownRole { value: String },
    UsernameTooShort { min: usize },
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyName,
    NameTooLong { max: usize },
    EmptyProfileUpdate,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::UnknownRole { value } => write!(f, "unknown role '{value}'"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain lowercase letters, digits, '_', '.', or '-'",
            ),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyProfileUpdate => write!(f, "at least one field must be provided"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Structured issue describing this failure; adapters add the path.
    #[must_use]
    pub fn to_issue(&self) -> ValidationIssue {
        let code = match self {
            Self::InvalidId | Self::UsernameInvalidCharacters => IssueCode::InvalidString,
            Self::UnknownRole { .. } => IssueCode::InvalidEnumValue,
            Self::UsernameTooShort { .. } | Self::EmptyName => IssueCode::TooSmall,
            Self::UsernameTooLong { .. } | Self::NameTooLong { .. } => IssueCode::TooBig,
            Self::EmptyProfileUpdate => IssueCode::Custom,
        };
        let issue = ValidationIssue::new(code, self.to_string());
        match self {
            Self::UnknownRole { value } => issue
                .with_received(serde_json::Value::String(value.clone()))
                .with_options(Role::ALL.iter().map(|role| role.as_str())),
            _ => issue,
        }
    }
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Authorisation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 2] = [Self::Admin, Self::User];

    /// Lowercase name stored in the database and used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

static USERNAME_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn username_has_allowed_chars(value: &str) -> bool {
    USERNAME_RE
        .get_or_init(|| Regex::new("^[a-z0-9_.-]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// Login handle, stored trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Normalise and validate a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = raw.as_ref().trim().to_lowercase();
        let length = normalized.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_has_allowed_chars(&normalized) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// First or last name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Trim and validate a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Active (not soft-deleted) user account. Credentials never leave the
/// persistence adapter through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub role: Role,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub username: Username,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    first_name: Option<PersonName>,
    last_name: Option<PersonName>,
}

impl ProfileUpdate {
    /// Build an update; at least one field must change.
    pub fn new(
        first_name: Option<PersonName>,
        last_name: Option<PersonName>,
    ) -> Result<Self, UserValidationError> {
        if first_name.is_none() && last_name.is_none() {
            return Err(UserValidationError::EmptyProfileUpdate);
        }
        Ok(Self {
            first_name,
            last_name,
        })
    }

    /// New first name, if changing.
    #[must_use]
    pub const fn first_name(&self) -> Option<&PersonName> {
        self.first_name.as_ref()
    }

    /// New last name, if changing.
    #[must_use]
    pub const fn last_name(&self) -> Option<&PersonName> {
        self.last_name.as_ref()
    }
}

/// Filters for the admin user listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
}
