//! Relay error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("missing rendezvous key")]
    MissingKey,

    #[error("missing role")]
    MissingRole,

    #[error("invalid role {value:?}, expected listener or client")]
    InvalidRole { value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::MissingKey | RelayError::MissingRole | RelayError::InvalidRole { .. } => {
                "bad_input"
            }
            RelayError::Json(_) => "encoding",
        }
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
