//! Core configuration, paths, and logging setup for the cyber range server.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, PolicyOverrides, RateLimitConfig, ToolsConfig, DEFAULT_BIND_ADDR, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
