use thiserror::Error;

/// Why a scanner request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("bad input: {message}")]
    BadInput { message: String },

    #[error("action not permitted: {value}")]
    NotPermitted { value: String },

    #[error("blocked flag: {flag}")]
    Blocked { flag: String },
}

impl PolicyViolation {
    pub fn code(&self) -> &'static str {
        match self {
            PolicyViolation::BadInput { .. } => "bad_input",
            PolicyViolation::NotPermitted { .. } => "not_permitted",
            PolicyViolation::Blocked { .. } => "blocked",
        }
    }

    pub(crate) fn bad_input(message: impl Into<String>) -> Self {
        PolicyViolation::BadInput {
            message: message.into(),
        }
    }
}

pub type PolicyResult<T> = Result<T, PolicyViolation>;
