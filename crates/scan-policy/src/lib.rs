//! Validation of untrusted scanner input.
//!
//! Every check is pure and runs in a fixed order; the first failure wins and
//! nothing is executed. A passing request yields the [`CommandSpec`] to run.

mod defaults;
mod error;
mod port;
mod web;

pub use command_runner::CommandSpec;
pub use defaults::{
    DEFAULT_NMAP_DENIED_FLAGS, DEFAULT_SQLMAP_ALLOWED_ACTIONS, DEFAULT_SQLMAP_DENIED_FLAGS,
};
pub use error::{PolicyResult, PolicyViolation};
pub use port::PortScanPolicy;
pub use web::WebScanPolicy;

use range_config::Config;
use std::time::Duration;

/// Policies for both scanner families.
#[derive(Debug, Clone, Default)]
pub struct ScanPolicy {
    pub web: WebScanPolicy,
    pub port: PortScanPolicy,
}

impl ScanPolicy {
    /// Build from configuration, keeping the built-in lists unless overridden.
    pub fn from_config(config: &Config) -> Self {
        let tools = &config.tools;
        let overrides = &config.policy;

        let mut web = WebScanPolicy::new(
            tools.sqlmap.clone(),
            Duration::from_secs(tools.sqlmap_timeout_secs),
        );
        if let Some(allowed) = &overrides.sqlmap_allowed_actions {
            web.allowed_actions = allowed.clone();
        }
        if let Some(denied) = &overrides.sqlmap_denied_flags {
            web.denied_flags = denied.clone();
        }

        let mut port = PortScanPolicy::new(
            tools.nmap.clone(),
            Duration::from_secs(tools.nmap_timeout_secs),
        );
        if let Some(denied) = &overrides.nmap_denied_flags {
            port.denied_flags = denied.clone();
        }

        Self { web, port }
    }

    /// Validate a web-scan request. See [`WebScanPolicy::validate`].
    pub fn web_scan(&self, url: &str, action: Option<&str>) -> PolicyResult<CommandSpec> {
        self.web.validate(url, action)
    }

    /// Validate a port-scan request. See [`PortScanPolicy::validate`].
    pub fn port_scan(&self, args: &str) -> PolicyResult<CommandSpec> {
        self.port.validate(args)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
