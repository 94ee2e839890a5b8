//! Health endpoints: liveness and readiness probes for orchestration and load balancers.
//! Document endpoints in OpenAPI via Utoipa.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use tracing::warn;

use crate::domain::ports::ReadinessProbe;

/// Shared health state for readiness and liveness checks.
///
/// Readiness needs both the startup flag and, when configured, a passing
/// dependency probe (a database ping in production).
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    probe: Option<Arc<dyn ReadinessProbe>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            probe: None,
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult `probe` on every readiness check.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return the startup readiness flag.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    async fn dependencies_ready(&self) -> bool {
        match &self.probe {
            None => true,
            Some(probe) => match probe.check().await {
                Ok(()) => true,
                Err(error) => {
                    warn!(%error, "readiness probe failed");
                    false
                }
            },
        }
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. Return 200 when startup finished and the database
/// answers; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (
            status = 405,
            description = "Method not allowed; only GET probes are supported"
        ),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let ok = state.is_ready() && state.dependencies_ready().await;
    HealthState::probe_response(ok)
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
/// Call `HealthState::mark_unhealthy` before graceful shutdown to surface the drain early.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (
            status = 405,
            description = "Method not allowed; only GET probes are supported"
        ),
        (
            status = 503,
            description = "Server is shutting down"
        )
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockReadinessProbe, RepositoryError};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    async fn probe_status(state: HealthState, uri: &str) -> StatusCode {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(ready)
                .service(live),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        res.status()
    }

    #[rstest]
    #[actix_web::test]
    async fn not_ready_until_marked() {
        assert_eq!(
            probe_status(HealthState::new(), "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        let state = HealthState::new();
        state.mark_ready();
        assert_eq!(probe_status(state, "/health/ready").await, StatusCode::OK);
    }

    #[rstest]
    #[case(true, StatusCode::OK)]
    #[case(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn readiness_consults_probe(#[case] healthy: bool, #[case] expected: StatusCode) {
        let mut probe = MockReadinessProbe::new();
        probe.expect_check().times(1).returning(move || {
            if healthy {
                Ok(())
            } else {
                Err(RepositoryError::connection("database unreachable"))
            }
        });
        let state = HealthState::new().with_probe(Arc::new(probe));
        state.mark_ready();
        assert_eq!(probe_status(state, "/health/ready").await, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_fails_once_draining() {
        let state = HealthState::new();
        state.mark_unhealthy();
        assert_eq!(
            probe_status(state, "/health/live").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
