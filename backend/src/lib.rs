//! Carmarket backend library.
//!
//! Hexagonal layout: [`domain`] holds entities, services, and ports;
//! [`inbound`] adapts HTTP and tRPC requests onto the driving ports;
//! [`outbound`] implements the driven ports with Diesel and credential
//! adapters; [`server`] wires everything into an Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
