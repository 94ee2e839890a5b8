//! Request middleware.
//!
//! Cross-cutting request lifecycle concerns: per-request trace identifiers
//! and tiered rate limiting.

pub mod throttle;
pub mod trace;

pub use throttle::{Throttle, ThrottleTier};
pub use trace::Trace;
