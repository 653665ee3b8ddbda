use crate::defaults::DEFAULT_NMAP_DENIED_FLAGS;
use crate::{to_strings, PolicyResult, PolicyViolation};
use command_runner::CommandSpec;
use std::time::Duration;
use tracing::debug;

const MAX_TOKENS: usize = 32;
const MAX_TOKEN_LEN: usize = 256;

/// Rules for the network mapper.
#[derive(Debug, Clone)]
pub struct PortScanPolicy {
    pub program: String,
    pub denied_flags: Vec<String>,
    pub timeout: Duration,
}

impl Default for PortScanPolicy {
    fn default() -> Self {
        Self::new("nmap", Duration::from_secs(60))
    }
}

impl PortScanPolicy {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            denied_flags: to_strings(DEFAULT_NMAP_DENIED_FLAGS),
            timeout,
        }
    }

    /// Split `args` on whitespace, check shape and deny-list, then build
    /// `<program> <tokens...>`.
    pub fn validate(&self, args: &str) -> PolicyResult<CommandSpec> {
        let tokens: Vec<&str> = args.split_whitespace().collect();

        if tokens.is_empty() {
            return Err(PolicyViolation::bad_input("args are required"));
        }
        if tokens.len() > MAX_TOKENS {
            return Err(PolicyViolation::bad_input(format!(
                "at most {MAX_TOKENS} arguments are accepted"
            )));
        }
        if tokens.iter().any(|token| token.len() > MAX_TOKEN_LEN) {
            return Err(PolicyViolation::bad_input(format!(
                "arguments are limited to {MAX_TOKEN_LEN} characters"
            )));
        }
        if tokens.iter().all(|token| token.starts_with('-')) {
            return Err(PolicyViolation::bad_input("a scan target is required"));
        }

        // Flags are case-sensitive for this tool (-sS and -ss differ), and
        // `--script=x` or `-oNfile` must still match.
        for token in &tokens {
            if let Some(flag) = self
                .denied_flags
                .iter()
                .find(|flag| token.starts_with(flag.as_str()))
            {
                debug!(flag = %flag, "port-scan request hit deny-list");
                return Err(PolicyViolation::Blocked { flag: flag.clone() });
            }
        }

        Ok(CommandSpec::new(
            self.program.clone(),
            tokens.into_iter().map(str::to_string).collect(),
            self.timeout,
        ))
    }
}
