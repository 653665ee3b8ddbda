//! Application wiring and lifecycle management.

mod init;
mod state;

pub use init::{run_server, serve};
pub use state::AppState;
