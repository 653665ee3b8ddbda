//! Configuration management for the server.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

const ENV_LOG_LEVEL: &str = "CYBERRANGE_LOG_LEVEL";
const ENV_BIND: &str = "CYBERRANGE_BIND";
const ENV_API_KEY: &str = "CYBERRANGE_API_KEY";

/// Main server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Address the HTTP/WebSocket server binds to.
    pub bind_addr: String,
    /// Pre-shared key required on guarded execution requests. `None` disables the check.
    pub api_key: Option<String>,
    /// Sliding-window rate limit for guarded execution.
    pub rate_limit: RateLimitConfig,
    /// External tool locations and deadlines.
    pub tools: ToolsConfig,
    /// Optional replacements for the built-in allow/deny lists.
    pub policy: PolicyOverrides,
}

/// Rate limit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Admissions allowed per identity within one window.
    pub max_attempts: usize,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Executable for the web-scan family.
    pub sqlmap: String,
    /// Executable for the port-scan family.
    pub nmap: String,
    pub sqlmap_timeout_secs: u64,
    pub nmap_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sqlmap: "sqlmap".to_string(),
            nmap: "nmap".to_string(),
            sqlmap_timeout_secs: 120,
            nmap_timeout_secs: 60,
        }
    }
}

/// Replacement lists for the scan policy. `None` keeps the built-in list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    pub sqlmap_allowed_actions: Option<Vec<String>>,
    pub sqlmap_denied_flags: Option<Vec<String>>,
    pub nmap_denied_flags: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_key: None,
            rate_limit: RateLimitConfig::default(),
            tools: ToolsConfig::default(),
            policy: PolicyOverrides::default(),
        }
    }
}

impl Config {
    /// Load configuration from `config.json` under `paths`, falling back to
    /// defaults when the file is missing. Environment variables win over the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        let api_key = config.api_key.take();
        config.set_api_key(api_key);
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Parse the bind address.
    pub fn bind_addr(&self) -> CoreResult<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|err| CoreError::Config(format!("invalid bind_addr {:?}: {err}", self.bind_addr)))
    }

    /// Set the pre-shared key. A blank value disables the key check, the same
    /// for the file, the environment and the command line.
    pub fn set_api_key(&mut self, raw: Option<String>) {
        self.api_key = raw.and_then(non_empty);
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        self.bind_addr()?;
        if self.rate_limit.max_attempts == 0 {
            return Err(CoreError::Config(
                "rate_limit.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(CoreError::Config(
                "rate_limit.window_secs must be at least 1".to_string(),
            ));
        }
        if self.tools.sqlmap_timeout_secs == 0 || self.tools.nmap_timeout_secs == 0 {
            return Err(CoreError::Config("tool timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(log_level) = lookup(ENV_LOG_LEVEL).and_then(non_empty) {
            self.log_level = log_level;
        }
        if let Some(bind) = lookup(ENV_BIND).and_then(non_empty) {
            self.bind_addr = bind;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.set_api_key(Some(api_key));
        }
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
