use thiserror::Error;

/// Failures to launch a child process.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{program} is not installed")]
    NotInstalled { program: String },

    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },
}

impl RunnerError {
    pub fn code(&self) -> &'static str {
        match self {
            RunnerError::NotInstalled { .. } => "not_installed",
            RunnerError::Spawn { .. } => "spawn_failed",
        }
    }
}

pub type RunnerResult<T> = Result<T, RunnerError>;
