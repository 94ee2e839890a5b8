//! Application settings loaded via OrthoConfig.
//!
//! Values come from `--flags`, `CARMARKET_*` environment variables, or a
//! configuration file, in that order of precedence. Secrets are not part of
//! these settings; see [`super::auth_config`].

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::middleware::ThrottleTier;

use super::config::RateLimits;
use crate::outbound::security::TokenLifetimes;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Process-wide settings for the carmarket server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARMARKET")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_size: u32,
    /// Apply pending migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Access token lifetime in seconds.
    #[ortho_config(default = 900)]
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds.
    #[ortho_config(default = 604_800)]
    pub refresh_token_ttl_secs: u64,
    /// Requests per window allowed by the burst tier.
    #[ortho_config(default = 3)]
    pub short_rate_limit: u32,
    /// Length of the burst window in seconds.
    #[ortho_config(default = 1)]
    pub short_rate_window_secs: u64,
    #[ortho_config(default = 20)]
    pub medium_rate_limit: u32,
    #[ortho_config(default = 10)]
    pub medium_rate_window_secs: u64,
    #[ortho_config(default = 100)]
    pub long_rate_limit: u32,
    #[ortho_config(default = 60)]
    pub long_rate_window_secs: u64,
    /// Requests per window allowed on the auth routes.
    #[ortho_config(default = 10)]
    pub auth_rate_limit: u32,
    /// Length of the auth rate limit window in seconds.
    #[ortho_config(default = 60)]
    pub auth_rate_window_secs: u64,
}

/// Problems with otherwise well-formed settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("database URL is not configured; set CARMARKET_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

impl AppSettings {
    /// Address the server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Database connection string.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Lifetimes handed to the token service.
    pub fn token_lifetimes(&self) -> Result<TokenLifetimes, SettingsError> {
        Ok(TokenLifetimes {
            access: Duration::from_secs(positive(
                "access_token_ttl_secs",
                self.access_token_ttl_secs,
            )?),
            refresh: Duration::from_secs(positive(
                "refresh_token_ttl_secs",
                self.refresh_token_ttl_secs,
            )?),
        })
    }

    /// General tiers plus the auth tier applied on top of them.
    pub fn rate_limits(&self) -> Result<RateLimits, SettingsError> {
        Ok(RateLimits {
            general: vec![
                tier(
                    "short",
                    ("short_rate_limit", self.short_rate_limit),
                    ("short_rate_window_secs", self.short_rate_window_secs),
                )?,
                tier(
                    "medium",
                    ("medium_rate_limit", self.medium_rate_limit),
                    ("medium_rate_window_secs", self.medium_rate_window_secs),
                )?,
                tier(
                    "long",
                    ("long_rate_limit", self.long_rate_limit),
                    ("long_rate_window_secs", self.long_rate_window_secs),
                )?,
            ],
            auth: tier(
                "auth",
                ("auth_rate_limit", self.auth_rate_limit),
                ("auth_rate_window_secs", self.auth_rate_window_secs),
            )?,
        })
    }
}

fn tier(
    name: &'static str,
    (limit_name, limit): (&'static str, u32),
    (window_name, window): (&'static str, u64),
) -> Result<ThrottleTier, SettingsError> {
    if limit == 0 {
        return Err(SettingsError::Zero { name: limit_name });
    }
    let window = positive(window_name, window)?;
    Ok(ThrottleTier::new(name, limit, Duration::from_secs(window)))
}

fn positive(name: &'static str, value: u64) -> Result<u64, SettingsError> {
    if value == 0 {
        Err(SettingsError::Zero { name })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 14] = [
        "CARMARKET_BIND_ADDR",
        "CARMARKET_DATABASE_URL",
        "CARMARKET_DB_POOL_SIZE",
        "CARMARKET_RUN_MIGRATIONS",
        "CARMARKET_ACCESS_TOKEN_TTL_SECS",
        "CARMARKET_REFRESH_TOKEN_TTL_SECS",
        "CARMARKET_SHORT_RATE_LIMIT",
        "CARMARKET_SHORT_RATE_WINDOW_SECS",
        "CARMARKET_MEDIUM_RATE_LIMIT",
        "CARMARKET_MEDIUM_RATE_WINDOW_SECS",
        "CARMARKET_LONG_RATE_LIMIT",
        "CARMARKET_LONG_RATE_WINDOW_SECS",
        "CARMARKET_AUTH_RATE_LIMIT",
        "CARMARKET_AUTH_RATE_WINDOW_SECS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("carmarket")]).expect("config should load")
    }

    /// Every variable unset except `overrides`.
    fn env_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_are_used_when_missing() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.db_pool_size, 10);
        assert!(settings.run_migrations);
        assert_eq!(
            settings.token_lifetimes().expect("lifetimes"),
            TokenLifetimes::default()
        );
        assert_eq!(
            settings.rate_limits().expect("rate limits"),
            RateLimits::default()
        );
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("CARMARKET_BIND_ADDR", "127.0.0.1:9000"),
            ("CARMARKET_DATABASE_URL", "postgres://localhost/carmarket"),
            ("CARMARKET_DB_POOL_SIZE", "4"),
            ("CARMARKET_ACCESS_TOKEN_TTL_SECS", "60"),
            ("CARMARKET_AUTH_RATE_LIMIT", "3"),
            ("CARMARKET_SHORT_RATE_LIMIT", "50"),
            ("CARMARKET_LONG_RATE_WINDOW_SECS", "120"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().expect("address").port(), 9000);
        assert_eq!(
            settings.database_url().expect("url"),
            "postgres://localhost/carmarket"
        );
        assert_eq!(settings.db_pool_size, 4);
        assert_eq!(
            settings.token_lifetimes().expect("lifetimes").access,
            Duration::from_secs(60)
        );
        let limits = settings.rate_limits().expect("rate limits");
        assert_eq!(limits.auth.limit, 3);
        assert_eq!(
            limits.general,
            [
                ThrottleTier::new("short", 50, Duration::from_secs(1)),
                ThrottleTier::MEDIUM,
                ThrottleTier::new("long", 100, Duration::from_secs(120)),
            ]
        );
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(env_with(&[("CARMARKET_BIND_ADDR", "localhost")]));

        let err = load_from_empty_args().bind_addr().expect_err("invalid address");
        assert!(matches!(err, SettingsError::InvalidBindAddr { .. }));
    }

    #[rstest]
    fn zero_token_lifetime_is_rejected() {
        let _guard = lock_env(env_with(&[("CARMARKET_REFRESH_TOKEN_TTL_SECS", "0")]));

        let err = load_from_empty_args()
            .token_lifetimes()
            .expect_err("zero lifetime");
        assert!(matches!(
            err,
            SettingsError::Zero {
                name: "refresh_token_ttl_secs"
            }
        ));
    }

    #[rstest]
    #[case("CARMARKET_MEDIUM_RATE_LIMIT", "medium_rate_limit")]
    #[case("CARMARKET_SHORT_RATE_WINDOW_SECS", "short_rate_window_secs")]
    #[case("CARMARKET_AUTH_RATE_LIMIT", "auth_rate_limit")]
    fn zero_rate_limit_values_are_rejected(#[case] var: &'static str, #[case] name: &str) {
        let _guard = lock_env(env_with(&[(var, "0")]));

        let err = load_from_empty_args()
            .rate_limits()
            .expect_err("zero limit");
        assert!(matches!(err, SettingsError::Zero { name: got } if got == name));
    }
}
