use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("rate limit exceeded, retry in {}s", retry_after.as_secs().max(1))]
    RateLimited { retry_after: Duration },
}

impl GateError {
    pub fn code(&self) -> &'static str {
        match self {
            GateError::Unauthorized => "unauthorized",
            GateError::RateLimited { .. } => "rate_limited",
        }
    }
}

pub type GateResult<T> = Result<T, GateError>;
