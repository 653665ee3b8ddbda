use crate::{GateError, GateResult, RateLimiter};
use std::time::Instant;
use tracing::warn;

/// Identity prefix used when the caller presents no key.
pub const ANONYMOUS: &str = "anonymous";

/// Credential check followed by rate limiting.
#[derive(Debug)]
pub struct AccessGate {
    api_key: Option<String>,
    limiter: RateLimiter,
}

impl AccessGate {
    /// `api_key: None` disables the credential step.
    pub fn new(api_key: Option<String>, limiter: RateLimiter) -> Self {
        Self { api_key, limiter }
    }

    pub fn admit(&self, presented_key: Option<&str>, source: &str, now: Instant) -> GateResult<()> {
        // Without a configured key the presented header is ignored, so rotating
        // it cannot mint fresh identities.
        let principal = match &self.api_key {
            Some(expected) if presented_key == Some(expected.as_str()) => expected.as_str(),
            Some(_) => {
                warn!(source, "rejected request with missing or invalid API key");
                return Err(GateError::Unauthorized);
            }
            None => ANONYMOUS,
        };

        let identity = format!("{principal}@{source}");
        self.limiter.check(&identity, now)
    }

    pub fn requires_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn tracked_identities(&self) -> usize {
        self.limiter.tracked_identities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn gate(key: Option<&str>, max: usize) -> AccessGate {
        AccessGate::new(
            key.map(str::to_string),
            RateLimiter::new(max, Duration::from_secs(60)),
        )
    }

    #[test]
    fn wrong_or_missing_key_is_unauthorized() {
        let gate = gate(Some("k3y"), 5);
        let now = Instant::now();

        assert_eq!(gate.admit(None, "10.0.0.1", now), Err(GateError::Unauthorized));
        assert_eq!(
            gate.admit(Some("nope"), "10.0.0.1", now),
            Err(GateError::Unauthorized)
        );
        assert!(gate.admit(Some("k3y"), "10.0.0.1", now).is_ok());
    }

    #[test]
    fn wrong_key_consumes_no_slot() {
        let gate = gate(Some("k3y"), 1);
        let now = Instant::now();

        for _ in 0..10 {
            assert!(gate.admit(Some("bad"), "10.0.0.1", now).is_err());
        }
        assert_eq!(gate.tracked_identities(), 0);
        assert!(gate.admit(Some("k3y"), "10.0.0.1", now).is_ok());
    }

    #[test]
    fn no_configured_key_keys_by_anonymous_source() {
        let gate = gate(None, 1);
        let now = Instant::now();

        assert!(!gate.requires_key());
        assert!(gate.admit(None, "10.0.0.1", now).is_ok());
        assert!(matches!(
            gate.admit(None, "10.0.0.1", now),
            Err(GateError::RateLimited { .. })
        ));
        assert!(gate.admit(None, "10.0.0.2", now).is_ok());
    }

    #[test]
    fn rotating_keys_without_configured_key_share_one_ceiling() {
        let gate = gate(None, 5);
        let now = Instant::now();

        let admitted = (0..100)
            .filter(|i| gate.admit(Some(&format!("junk{i}")), "10.0.0.1", now).is_ok())
            .count();

        assert_eq!(admitted, 5);
        assert_eq!(gate.tracked_identities(), 1);
    }

    #[test]
    fn sixth_admission_in_window_is_rate_limited() {
        let gate = gate(Some("k3y"), 5);
        let now = Instant::now();

        for i in 0..5 {
            gate.admit(Some("k3y"), "src", now + Duration::from_secs(i))
                .unwrap();
        }
        let err = gate
            .admit(Some("k3y"), "src", now + Duration::from_secs(5))
            .unwrap_err();
        assert_eq!(err.code(), "rate_limited");
    }
}
