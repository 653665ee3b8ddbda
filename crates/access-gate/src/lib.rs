//! Admission control for guarded execution.
//!
//! [`AccessGate`] checks the pre-shared key first and only then consults the
//! [`RateLimiter`], so a caller with the wrong key never uses up a slot.

mod error;
mod gate;
mod limiter;

pub use error::{GateError, GateResult};
pub use gate::{AccessGate, ANONYMOUS};
pub use limiter::{RateLimiter, DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW};
