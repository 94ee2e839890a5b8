//! tRPC-compatible adapter over the same driving ports as the REST API.
//!
//! ```text
//! GET  /trpc/cars.list?input={"yearFrom":2015}
//! POST /trpc/cars.create   {"year":2019,"color":"blue",…}
//! ```
//!
//! Queries use GET with a JSON-encoded `input` parameter, mutations use POST
//! with a JSON body. Inputs go through the REST request validation, so both
//! surfaces report identical issues.

mod procedures;
mod router;
mod wire;

pub use router::configure;
pub use wire::{TrpcCode, TrpcError, TrpcSuccess, rejection_response};
