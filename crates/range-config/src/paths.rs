//! File system paths for the server.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

const BASE_DIR_NAME: &str = ".cyberrange";

/// Manages file system paths for the server.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.cyberrange)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.cyberrange`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.cyberrange).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.cyberrange/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the directory holding execution reports (~/.cyberrange/reports).
    pub fn reports_dir(&self) -> PathBuf {
        self.base_dir.join("reports")
    }

    /// Get the logs directory (~/.cyberrange/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the structured server log (~/.cyberrange/logs/server.jsonl).
    pub fn server_log_file(&self) -> PathBuf {
        self.logs_dir().join("server.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.reports_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
