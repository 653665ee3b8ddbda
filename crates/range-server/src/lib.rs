//! Cyber range server.
//!
//! Two independent surfaces share one listener:
//!
//! - `/ws/relay` pairs a listener and a client under a shared key and relays
//!   text between them (see the `rendezvous` crate).
//! - `/run/*` runs a scanner behind the access gate, the scan policy and a
//!   hard timeout, and records every run as a write-once report.

pub mod app;
pub mod guarded;
pub mod http;

pub use app::{run_server, serve, AppState};
pub use guarded::{Caller, GuardedError, GuardedExecutor, GuardedOutcome, ScanRequest};
