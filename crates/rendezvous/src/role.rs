use crate::RelayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of a rendezvous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Listener,
    Client,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Role::Listener => Role::Client,
            Role::Client => Role::Listener,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Listener => "listener",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listener" => Ok(Role::Listener),
            "client" => Ok(Role::Client),
            other => Err(RelayError::InvalidRole {
                value: other.to_string(),
            }),
        }
    }
}
