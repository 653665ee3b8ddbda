//! Logging initialization for the server.
//!
//! Delegates to the observability crate: compact logs on stderr plus
//! structured JSONL in `~/.cyberrange/logs/server.jsonl`.

use crate::Paths;

const SERVICE_NAME: &str = "range-server";

/// Initialize the logging system.
///
/// `level` is the default filter; `RUST_LOG` overrides it. When `paths` is
/// given, events are also appended to the JSONL server log.
pub fn init_logging(level: &str, paths: Option<&Paths>) {
    observability::init_with_config(observability::LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level.into(),
        log_path: paths.map(Paths::server_log_file),
        also_stderr: true,
    });
}
