//! Authentication primitives: credentials, principals, and issued tokens.
//!
//! Inbound adapters build these from raw strings before calling a driving
//! port, so services only ever see validated values. Secret material is held
//! in [`Zeroizing`] buffers and wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::error::{Error, IssueCode, ValidationIssue};
use super::user::{PersonName, Role, User, UserId, Username};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted at registration.
pub const PASSWORD_MAX: usize = 128;

/// Validation errors for credential inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Password longer than [`PASSWORD_MAX`].
    PasswordTooLong { max: usize },
    /// API key was not of the form `<key_id>.<secret>`.
    MalformedApiKey,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
            Self::MalformedApiKey => write!(f, "API key must look like '<key_id>.<secret>'"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl CredentialValidationError {
    /// Structured issue describing this failure; adapters add the path.
    #[must_use]
    pub fn to_issue(&self) -> ValidationIssue {
        let code = match self {
            Self::EmptyUsername | Self::EmptyPassword | Self::PasswordTooShort { .. } => {
                IssueCode::TooSmall
            }
            Self::PasswordTooLong { .. } => IssueCode::TooBig,
            Self::MalformedApiKey => IssueCode::InvalidString,
        };
        ValidationIssue::new(code, self.to_string())
    }
}

/// Plain-text password. Whitespace is significant and kept as supplied.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a new password against the length policy.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(CredentialValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Expose the secret for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed, lower-cased, and non-empty.
/// - `password` is non-empty but not checked against the registration
///   policy, so accounts created under older rules can still sign in.
///
/// # Examples
/// ```
/// use carmarket::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Admin ", "password").unwrap();
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let normalized = username.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CredentialValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username suitable for lookups.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Validated self-service sign-up request. New accounts always get
/// [`Role::User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub username: Username,
    pub password: Password,
}

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    role: Role,
}

impl Principal {
    /// Principal for `user_id` acting with `role`.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Authenticated user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Role at the time the credential was verified.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether the caller is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Fail with [`Error::forbidden`] unless the caller is an administrator.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }

    /// Whether the caller may act on a resource owned by `owner`.
    #[must_use]
    pub fn may_act_for(&self, owner: UserId) -> bool {
        self.is_admin() || self.user_id == owner
    }

    /// Fail with [`Error::forbidden`] unless [`Self::may_act_for`] holds.
    pub fn require_owner_or_admin(&self, owner: UserId) -> Result<(), Error> {
        if self.may_act_for(owner) {
            Ok(())
        } else {
            Err(Error::forbidden("only the owner or an administrator may do this"))
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// Freshly minted access and refresh tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: Zeroizing<String>,
    pub refresh_token: Zeroizing<String>,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: u64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("expires_in", &self.expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}

/// Claims recovered from a verified refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshClaims {
    pub user_id: UserId,
}

/// API key presented in the `X-API-Key` header.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeyCredential {
    key_id: String,
    secret: Zeroizing<String>,
}

impl ApiKeyCredential {
    /// Split `<key_id>.<secret>`; both halves must be non-empty
    /// alphanumerics.
    pub fn parse(raw: &str) -> Result<Self, CredentialValidationError> {
        let (key_id, secret) = raw
            .trim()
            .split_once('.')
            .ok_or(CredentialValidationError::MalformedApiKey)?;
        let well_formed = |part: &str| {
            !part.is_empty() && part.chars().all(|ch| ch.is_ascii_alphanumeric())
        };
        if !well_formed(key_id) || !well_formed(secret) {
            return Err(CredentialValidationError::MalformedApiKey);
        }
        Ok(Self {
            key_id: key_id.to_owned(),
            secret: Zeroizing::new(secret.to_owned()),
        })
    }

    /// Public lookup half.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Secret half.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }
}

impl fmt::Debug for ApiKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredential")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Newly generated API key. The plain secret is shown to the owner once and
/// only `secret_digest` is persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedApiKey {
    pub key_id: String,
    pub secret: Zeroizing<String>,
    pub secret_digest: String,
}

impl IssuedApiKey {
    /// Header value the owner presents: `<key_id>.<secret>`.
    #[must_use]
    pub fn token(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("{}.{}", self.key_id, self.secret.as_str()))
    }
}

impl fmt::Debug for IssuedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedApiKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
