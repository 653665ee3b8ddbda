//! Server state definition.

use crate::guarded::GuardedExecutor;
use access_gate::{AccessGate, RateLimiter};
use range_config::Config;
use rendezvous::SessionRegistry;
use report_sink::ReportSink;
use scan_policy::ScanPolicy;
use std::sync::Arc;

/// Shared server state (cheap to clone).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Live relay sessions.
    pub registry: Arc<SessionRegistry>,
    /// Gate, policy, runner and report sink for `/run/*`.
    pub executor: Arc<GuardedExecutor>,
}

impl AppState {
    pub fn new(config: Config, reports: ReportSink) -> Self {
        let limiter = RateLimiter::new(config.rate_limit.max_attempts, config.rate_limit.window());
        let gate = AccessGate::new(config.api_key.clone(), limiter);
        let policy = ScanPolicy::from_config(&config);

        Self {
            config: Arc::new(config),
            registry: Arc::new(SessionRegistry::new()),
            executor: Arc::new(GuardedExecutor::new(gate, policy, reports)),
        }
    }
}
