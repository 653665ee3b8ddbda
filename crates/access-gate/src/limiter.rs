use crate::{GateError, GateResult};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter keyed by caller identity.
///
/// Each identity keeps the instants of its admitted attempts. Entries older
/// than the window are pruned lazily, only when that identity is checked.
#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    records: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Admit `identity` at `now`, or report how long until a slot frees up.
    ///
    /// A denied attempt is not recorded.
    pub fn check(&self, identity: &str, now: Instant) -> GateResult<()> {
        let mut records = self.records.lock();
        let attempts = records.entry(identity.to_string()).or_default();

        while attempts
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= self.window)
        {
            attempts.pop_front();
        }

        if attempts.len() >= self.max_attempts {
            let retry_after = attempts
                .front()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            debug!(identity, attempts = attempts.len(), "rate limit hit");
            return Err(GateError::RateLimited { retry_after });
        }

        attempts.push_back(now);
        Ok(())
    }

    /// Number of identities with a record.
    pub fn tracked_identities(&self) -> usize {
        self.records.lock().len()
    }
}
