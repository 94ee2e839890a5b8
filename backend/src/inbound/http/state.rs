//! Shared HTTP adapter state.
//!
//! HTTP and tRPC handlers accept this state via `actix_web::web::Data` so
//! they only depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    Authenticator, CarListings, CarModelCatalog, ManufacturerCatalog, UserAccounts,
};

use super::auth::RefreshCookiePolicy;

/// Parameter object bundling the driving ports used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn Authenticator>,
    pub manufacturers: Arc<dyn ManufacturerCatalog>,
    pub models: Arc<dyn CarModelCatalog>,
    pub cars: Arc<dyn CarListings>,
    pub users: Arc<dyn UserAccounts>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn Authenticator>,
    pub manufacturers: Arc<dyn ManufacturerCatalog>,
    pub models: Arc<dyn CarModelCatalog>,
    pub cars: Arc<dyn CarListings>,
    pub users: Arc<dyn UserAccounts>,
    pub refresh_cookie: RefreshCookiePolicy,
}

impl HttpState {
    /// Construct state from the ports bundle and the refresh cookie policy.
    pub fn new(ports: HttpStatePorts, refresh_cookie: RefreshCookiePolicy) -> Self {
        let HttpStatePorts {
            auth,
            manufacturers,
            models,
            cars,
            users,
        } = ports;
        Self {
            auth,
            manufacturers,
            models,
            cars,
            users,
            refresh_cookie,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, RefreshCookiePolicy::default())
    }
}
