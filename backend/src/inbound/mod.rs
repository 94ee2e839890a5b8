//! Inbound adapters translating external requests into driving-port calls.
//!
//! REST handlers live under [`http`]; the tRPC-style surface in [`trpc`]
//! reuses their request validation and response shapes.

pub mod http;
pub mod trpc;
