use crate::{RelayResult, Role};
use serde::{Deserialize, Serialize};

/// Control messages the relay sends to its own peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Connected { role: Role, key: String },
    Waiting { message: String },
    Error { message: String },
}

impl Notice {
    pub fn connected(role: Role, key: &str) -> Self {
        Notice::Connected {
            role,
            key: key.to_string(),
        }
    }

    pub fn waiting() -> Self {
        Notice::Waiting {
            message: "waiting for peer".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> RelayResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
