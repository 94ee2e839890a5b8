//! Request authentication for HTTP and tRPC handlers.
//!
//! Callers present either `Authorization: Bearer <access token>` or
//! `X-API-Key: <key_id>.<secret>`. Handlers that need an identity take an
//! [`Authenticated`] argument; the extractor resolves it through the
//! [`Authenticator`] port so no token or hashing detail leaks into handlers.

use std::sync::Arc;

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::Authenticator;
use crate::domain::{ApiKeyCredential, Error, Principal};

use super::state::HttpState;

/// Header carrying an API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Credential found on a request, before verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentedCredential {
    Bearer(String),
    ApiKey(String),
}

/// Read the credential a request carries, if any.
///
/// A bearer token takes precedence over an API key. An `Authorization`
/// header using another scheme is rejected rather than ignored.
pub fn presented_credential(headers: &HeaderMap) -> Result<Option<PresentedCredential>, Error> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let raw = value
            .to_str()
            .map_err(|_| Error::unauthorized("malformed authorization header"))?;
        let token = raw
            .strip_prefix("Bearer ")
            .or_else(|| raw.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
        return Ok(Some(PresentedCredential::Bearer(token.to_owned())));
    }
    if let Some(value) = headers.get(API_KEY_HEADER) {
        let raw = value
            .to_str()
            .map_err(|_| Error::unauthorized("malformed API key header"))?;
        return Ok(Some(PresentedCredential::ApiKey(raw.trim().to_owned())));
    }
    Ok(None)
}

/// Verify a presented credential.
pub async fn verify_credential(
    auth: &dyn Authenticator,
    credential: PresentedCredential,
) -> Result<Principal, Error> {
    match credential {
        PresentedCredential::Bearer(token) => auth.authenticate_bearer(&token).await,
        PresentedCredential::ApiKey(raw) => {
            let key = ApiKeyCredential::parse(&raw)
                .map_err(|_| Error::unauthorized("invalid API key"))?;
            auth.authenticate_api_key(&key).await
        }
    }
}

fn authenticator(req: &HttpRequest) -> Result<Arc<dyn Authenticator>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .map(|state| Arc::clone(&state.auth))
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

/// Extractor requiring an authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    /// The resolved principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let credential = presented_credential(req.headers());
        let auth = authenticator(req);
        Box::pin(async move {
            let credential =
                credential?.ok_or_else(|| Error::unauthorized("authentication required"))?;
            let auth = auth?;
            verify_credential(auth.as_ref(), credential)
                .await
                .map(Authenticated)
        })
    }
}
