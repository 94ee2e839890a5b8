//! Tiered fixed-window rate limiting keyed by client address.
//!
//! A [`Throttle`] holds one or more [`ThrottleTier`]s. Every request counts
//! against each tier's current window; once any tier is over its limit the
//! request is answered with `429 Too Many Requests` and a `Retry-After`
//! header naming the seconds until the longest blocking window resets.
//!
//! Clones share counters, so one `Throttle` may guard several scopes. Each
//! clone may render its rejection differently; see
//! [`Throttle::rejecting_with`].

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderValue, RETRY_AFTER};
use actix_web::{Error, HttpResponse, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

/// Prune expired windows once the table grows beyond this many entries.
const PRUNE_THRESHOLD: usize = 10_000;

/// One fixed-window limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleTier {
    pub name: &'static str,
    pub limit: u32,
    pub window: Duration,
}

impl ThrottleTier {
    /// At most `limit` requests per `window`.
    #[must_use]
    pub const fn new(name: &'static str, limit: u32, window: Duration) -> Self {
        Self {
            name,
            limit,
            window,
        }
    }

    /// Burst guard: 3 requests per second.
    pub const SHORT: Self = Self::new("short", 3, Duration::from_secs(1));
    /// 20 requests per 10 seconds.
    pub const MEDIUM: Self = Self::new("medium", 20, Duration::from_secs(10));
    /// 100 requests per minute.
    pub const LONG: Self = Self::new("long", 100, Duration::from_secs(60));
    /// Credential endpoints: 10 requests per minute.
    pub const AUTH: Self = Self::new("auth", 10, Duration::from_secs(60));
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct RateLimiter {
    tiers: Vec<ThrottleTier>,
    windows: Mutex<HashMap<(usize, String), Window>>,
}

impl RateLimiter {
    /// Count a hit for `client` at `now`; `Err` carries the wait before the
    /// client may retry.
    fn hit(&self, client: &str, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() > PRUNE_THRESHOLD {
            let longest = self
                .tiers
                .iter()
                .map(|tier| tier.window)
                .max()
                .unwrap_or_default();
            windows.retain(|_, window| now.duration_since(window.started) < longest);
        }

        let mut retry_after: Option<Duration> = None;
        for (index, tier) in self.tiers.iter().enumerate() {
            let window = windows
                .entry((index, client.to_owned()))
                .or_insert(Window {
                    started: now,
                    count: 0,
                });
            let elapsed = now.duration_since(window.started);
            if elapsed >= tier.window {
                *window = Window {
                    started: now,
                    count: 0,
                };
            }
            window.count = window.count.saturating_add(1);
            if window.count > tier.limit {
                let wait = tier.window.saturating_sub(now.duration_since(window.started));
                retry_after = Some(retry_after.map_or(wait, |current| current.max(wait)));
            }
        }

        retry_after.map_or(Ok(()), Err)
    }
}

/// Builds the response for a throttled request from its path and the
/// `TooManyRequests` error.
pub type RejectionRenderer = fn(&str, &DomainError) -> HttpResponse;

fn error_envelope(_path: &str, error: &DomainError) -> HttpResponse {
    error.error_response()
}

/// Rate limiting middleware factory.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use carmarket::middleware::{Throttle, ThrottleTier};
///
/// let throttle = Throttle::new(vec![ThrottleTier::SHORT, ThrottleTier::LONG]);
/// let app = App::new().wrap(throttle);
/// ```
#[derive(Debug, Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter>,
    render: RejectionRenderer,
}

impl Throttle {
    /// Throttle enforcing every tier in `tiers`, rejecting with the REST
    /// error envelope.
    #[must_use]
    pub fn new(tiers: Vec<ThrottleTier>) -> Self {
        Self {
            limiter: Arc::new(RateLimiter {
                tiers,
                windows: Mutex::new(HashMap::new()),
            }),
            render: error_envelope,
        }
    }

    /// Same counters, different rejection body.
    #[must_use]
    pub fn rejecting_with(mut self, render: RejectionRenderer) -> Self {
        self.render = render;
        self
    }
}

fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip())
        .map_or_else(|| "unknown".to_owned(), |ip: IpAddr| ip.to_string())
}

fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs();
    if wait.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs.max(1)
    }
}

impl<S, B> Transform<S, ServiceRequest> for Throttle
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ThrottleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ThrottleMiddleware {
            service,
            limiter: Arc::clone(&self.limiter),
            render: self.render,
        }))
    }
}

/// Service wrapper produced by [`Throttle`].
pub struct ThrottleMiddleware<S> {
    service: S,
    limiter: Arc<RateLimiter>,
    render: RejectionRenderer,
}

impl<S, B> Service<ServiceRequest> for ThrottleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = client_key(&req);
        let render = self.render;
        match self.limiter.hit(&client, Instant::now()) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(wait) => Box::pin(async move {
                let secs = retry_after_secs(wait);
                warn!(client = %client, path = req.path(), retry_after = secs, "rate limit exceeded");
                // Built inside the future so the request trace id is in scope.
                let error = DomainError::too_many_requests(format!(
                    "Too many requests; retry in {secs} second(s)"
                ));
                let mut response = render(req.path(), &error);
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(secs));
                Ok(req.into_response(response).map_into_right_body())
            }),
        }
    }
}
