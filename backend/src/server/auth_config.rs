//! Token secrets and refresh cookie settings read from the environment.
//!
//! Release builds require every toggle to be set explicitly and refuse weak
//! or missing secrets. Debug builds warn and fall back to safe defaults, with
//! ephemeral secrets generated per process.

use std::path::PathBuf;

use actix_web::cookie::SameSite;
use mockable::Env;
use rand::RngCore;
use tracing::warn;
use zeroize::Zeroize;

use crate::inbound::http::auth::RefreshCookiePolicy;
use crate::outbound::security::JwtSecrets;

const ACCESS_SECRET_FILE_ENV: &str = "JWT_ACCESS_SECRET_FILE";
const REFRESH_SECRET_FILE_ENV: &str = "JWT_REFRESH_SECRET_FILE";
const ACCESS_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/jwt_access_secret";
const REFRESH_SECRET_DEFAULT_PATH: &str = "/var/run/secrets/jwt_refresh_secret";
const ALLOW_EPHEMERAL_ENV: &str = "AUTH_ALLOW_EPHEMERAL";
const COOKIE_SECURE_ENV: &str = "REFRESH_COOKIE_SECURE";
const SAMESITE_ENV: &str = "REFRESH_COOKIE_SAMESITE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Minimum secret length accepted in release builds.
pub const SECRET_MIN_LEN: usize = 32;
const EPHEMERAL_SECRET_LEN: usize = 64;

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use carmarket::server::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Secrets and cookie policy for the authentication adapters.
pub struct AuthSettings {
    /// HS256 secrets for access and refresh tokens.
    pub secrets: JwtSecrets,
    /// Attributes of the refresh token cookie.
    pub refresh_cookie: RefreshCookiePolicy,
}

/// Errors raised while validating authentication configuration.
#[derive(thiserror::Error, Debug)]
pub enum AuthConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading a secret file failed.
    #[error("failed to read secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A secret file is too short for release builds.
    #[error("secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Access and refresh tokens must not share a secret.
    #[error("JWT_ACCESS_SECRET_FILE and JWT_REFRESH_SECRET_FILE hold the same secret")]
    SharedSecret,
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("REFRESH_COOKIE_SAMESITE=None requires REFRESH_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral secrets.
    #[error("AUTH_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build authentication settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use carmarket::server::{BuildMode, auth_settings_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = std::env::temp_dir();
/// let access = dir.join("carmarket_access_example");
/// let refresh = dir.join("carmarket_refresh_example");
/// std::fs::write(&access, vec![b'a'; 32])?;
/// std::fs::write(&refresh, vec![b'r'; 32])?;
///
/// let (access_path, refresh_path) = (
///     access.to_string_lossy().into_owned(),
///     refresh.to_string_lossy().into_owned(),
/// );
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "JWT_ACCESS_SECRET_FILE" => Some(access_path.clone()),
///     "JWT_REFRESH_SECRET_FILE" => Some(refresh_path.clone()),
///     "REFRESH_COOKIE_SECURE" => Some("1".to_owned()),
///     "REFRESH_COOKIE_SAMESITE" => Some("Strict".to_owned()),
///     "AUTH_ALLOW_EPHEMERAL" => Some("0".to_owned()),
///     _ => None,
/// });
///
/// let settings = auth_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.refresh_cookie.secure);
///
/// std::fs::remove_file(&access)?;
/// std::fs::remove_file(&refresh)?;
/// # Ok(())
/// # }
/// ```
pub fn auth_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<AuthSettings, AuthConfigError> {
    let secure = cookie_secure_from_env(env, mode)?;
    let same_site = same_site_from_env(env, mode, secure)?;
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;

    let mut access = secret_from_env(
        env,
        mode,
        allow_ephemeral,
        ACCESS_SECRET_FILE_ENV,
        ACCESS_SECRET_DEFAULT_PATH,
    )?;
    let mut refresh = secret_from_env(
        env,
        mode,
        allow_ephemeral,
        REFRESH_SECRET_FILE_ENV,
        REFRESH_SECRET_DEFAULT_PATH,
    )?;
    if access == refresh {
        access.zeroize();
        refresh.zeroize();
        return Err(AuthConfigError::SharedSecret);
    }

    Ok(AuthSettings {
        secrets: JwtSecrets::new(access, refresh),
        refresh_cookie: RefreshCookiePolicy { secure, same_site },
    })
}

fn debug_or_error<T>(
    mode: BuildMode,
    fallback: T,
    error: AuthConfigError,
    warn_fn: impl FnOnce(),
) -> Result<T, AuthConfigError> {
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn cookie_secure_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, AuthConfigError> {
    match env.string(COOKIE_SECURE_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => debug_or_error(
                mode,
                true,
                AuthConfigError::InvalidEnv {
                    name: COOKIE_SECURE_ENV,
                    value: value.clone(),
                    expected: BOOL_EXPECTED,
                },
                || warn!(value = %value, "invalid REFRESH_COOKIE_SECURE; defaulting to secure"),
            ),
        },
        None => debug_or_error(
            mode,
            true,
            AuthConfigError::MissingEnv {
                name: COOKIE_SECURE_ENV,
            },
            || warn!("REFRESH_COOKIE_SECURE not set; defaulting to secure"),
        ),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, AuthConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let Some(value) = env.string(SAMESITE_ENV) else {
        return debug_or_error(
            mode,
            default_same_site,
            AuthConfigError::MissingEnv { name: SAMESITE_ENV },
            || warn!("REFRESH_COOKIE_SAMESITE not set; using default"),
        );
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => debug_or_error(
            mode,
            SameSite::None,
            AuthConfigError::InsecureSameSiteNone,
            || warn!("REFRESH_COOKIE_SAMESITE=None without a secure cookie; browsers may drop it"),
        ),
        _ => debug_or_error(
            mode,
            default_same_site,
            AuthConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: value.clone(),
                expected: SAMESITE_EXPECTED,
            },
            || warn!(value = %value, "invalid REFRESH_COOKIE_SAMESITE; using default"),
        ),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, AuthConfigError> {
    match env.string(ALLOW_EPHEMERAL_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(true) if mode.is_debug() => Ok(true),
            Some(true) => Err(AuthConfigError::EphemeralNotAllowed),
            Some(false) => Ok(false),
            None => debug_or_error(
                mode,
                false,
                AuthConfigError::InvalidEnv {
                    name: ALLOW_EPHEMERAL_ENV,
                    value: value.clone(),
                    expected: BOOL_EXPECTED,
                },
                || warn!(value = %value, "invalid AUTH_ALLOW_EPHEMERAL; defaulting to disabled"),
            ),
        },
        None => debug_or_error(
            mode,
            false,
            AuthConfigError::MissingEnv {
                name: ALLOW_EPHEMERAL_ENV,
            },
            || warn!("AUTH_ALLOW_EPHEMERAL not set; defaulting to disabled"),
        ),
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
    name: &'static str,
    default_path: &str,
) -> Result<Vec<u8>, AuthConfigError> {
    let path = PathBuf::from(env.string(name).unwrap_or_else(|| default_path.to_owned()));

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            while bytes.last().is_some_and(u8::is_ascii_whitespace) {
                bytes.pop();
            }
            let length = bytes.len();
            if mode == BuildMode::Release && length < SECRET_MIN_LEN {
                bytes.zeroize();
                return Err(AuthConfigError::SecretTooShort {
                    path,
                    length,
                    min_len: SECRET_MIN_LEN,
                });
            }
            Ok(bytes)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                variable = name,
                path = %path.display(),
                %error,
                "using ephemeral token secret (dev only)"
            );
            let mut bytes = vec![0_u8; EPHEMERAL_SECRET_LEN];
            rand::thread_rng().fill_bytes(&mut bytes);
            Ok(bytes)
        }
        Err(source) => Err(AuthConfigError::SecretRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
