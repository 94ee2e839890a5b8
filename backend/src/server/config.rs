//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use crate::middleware::ThrottleTier;
use crate::outbound::persistence::DbPool;
use crate::outbound::security::TokenLifetimes;

use super::auth_config::AuthSettings;

/// Tiers guarding the API and tRPC scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimits {
    /// Applied to every `/api/v1` and `/trpc` request.
    pub general: Vec<ThrottleTier>,
    /// Applied to `/api/v1/auth` on top of `general`.
    pub auth: ThrottleTier,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            general: vec![ThrottleTier::SHORT, ThrottleTier::MEDIUM, ThrottleTier::LONG],
            auth: ThrottleTier::AUTH,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) auth: AuthSettings,
    pub(crate) lifetimes: TokenLifetimes,
    pub(crate) rate_limits: RateLimits,
}

impl ServerConfig {
    /// Construct a configuration with default token lifetimes and rate limits.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, auth: AuthSettings) -> Self {
        Self {
            bind_addr,
            db_pool,
            auth,
            lifetimes: TokenLifetimes::default(),
            rate_limits: RateLimits::default(),
        }
    }

    /// Override access and refresh token lifetimes.
    #[must_use]
    pub fn with_token_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    /// Override the throttle tiers.
    #[must_use]
    pub fn with_rate_limits(mut self, limits: RateLimits) -> Self {
        self.rate_limits = limits;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
