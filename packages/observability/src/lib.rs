//! # Observability
//!
//! Centralized tracing setup for the cyber range services.
//!
//! Services call [`init_with_config`] once at startup and then log through
//! the standard `tracing` macros. They never know where lines end up:
//!
//! - a compact human-readable stream on stderr, and
//! - optionally, one JSON object per event appended to a JSONL file that can
//!   be followed with `tail -f server.jsonl | jq`.
//!
//! Field names that look like credentials (`api_key`, `token`, ...) are
//! redacted before they reach the JSONL file.
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "range-server".into(),
//!     default_level: "debug".into(),
//!     log_path: Some(paths.server_log_file()),
//!     ..Default::default()
//! });
//! tracing::info!("ready");
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use file_sink::{CentralLogWriter, WriterFactory};
use json_layer::JsonLayer;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every JSONL line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Overridden by the `RUST_LOG` environment variable.
    pub default_level: String,

    /// JSONL file to append structured events to. `None` disables the file.
    pub log_path: Option<PathBuf>,

    /// Emit compact logs on stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: true,
        }
    }
}

/// Initialize logging with custom configuration.
///
/// Calling this twice in one process is harmless; the second call keeps the
/// first subscriber.
pub fn init_with_config(config: LogConfig) {
    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let json_layer = config.log_path.as_ref().and_then(|path| {
        match CentralLogWriter::new(path) {
            Ok(writer) => Some(
                JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
                    .with_filter(env_filter()),
            ),
            Err(err) => {
                eprintln!("failed to open log file {}: {err}", path.display());
                None
            }
        }
    });

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter())
    });

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            service = %config.service_name,
            log_path = ?config.log_path.as_ref().map(|p| p.display().to_string()),
            "observability initialized"
        );
    }
}
