//! Port for dependency health checks behind the readiness probe.

use async_trait::async_trait;

use super::RepositoryError;

/// Answers whether backing infrastructure can serve traffic right now.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Round-trip to the dependency; `Err` marks the service not ready.
    async fn check(&self) -> Result<(), RepositoryError>;
}
