//! Cyber range server binary.
//!
//! Usage: range-server [--bind <addr>] [--api-key <key>] [--base-dir <dir>]

use std::path::PathBuf;

use clap::Parser;
use range_config::{init_logging, Config, Paths};

/// Session relay and guarded tool execution for the cyber range.
#[derive(Parser, Debug)]
#[command(name = "range-server")]
#[command(about = "Session relay and guarded tool execution for the cyber range")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). Overrides config and CYBERRANGE_LOG_LEVEL.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Base directory for config, reports and logs. Defaults to ~/.cyberrange
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:8000. Overrides config and CYBERRANGE_BIND.
    #[arg(long)]
    bind: Option<String>,

    /// Pre-shared key for /run/* requests. Overrides config and CYBERRANGE_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;

    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if cli.api_key.is_some() {
        config.set_api_key(cli.api_key);
    }
    config.validate()?;

    paths.ensure_dirs()?;
    init_logging(&config.log_level, Some(&paths));

    range_server::run_server(config, paths).await
}
