use crate::{ReportError, ReportResult};
use chrono::{SecondsFormat, Utc};
use command_runner::CommandResult;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const REPORT_EXTENSION: &str = "txt";

/// Opaque identifier handed back to callers; displays as a hyphenated UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportId(Uuid);

impl ReportId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ReportId {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ReportError::NotFound { id: s.to_string() })
    }
}

/// Directory of write-once report files.
#[derive(Debug, Clone)]
pub struct ReportSink {
    dir: PathBuf,
}

impl ReportSink {
    /// Use `dir` for reports, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> ReportResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one execution under a fresh id.
    pub fn write(&self, command_line: &str, result: &CommandResult) -> ReportResult<ReportId> {
        let id = ReportId::generate();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let content = render_report(command_line, result, &created_at);

        write_once(&self.report_path(&id), &content)?;
        info!(report_id = %id, exit_code = result.exit_code, "report written");
        Ok(id)
    }

    /// Exact text of a previously written report.
    pub fn read(&self, id: &str) -> ReportResult<String> {
        let parsed: ReportId = id.parse()?;
        match fs::read_to_string(self.report_path(&parsed)) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(report_id = id, "report lookup missed");
                Err(ReportError::NotFound { id: id.to_string() })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn report_path(&self, id: &ReportId) -> PathBuf {
        self.dir.join(format!("{id}.{REPORT_EXTENSION}"))
    }
}

/// Human-readable rendering of one execution.
pub fn render_report(command_line: &str, result: &CommandResult, created_at: &str) -> String {
    format!(
        "command: {command_line}\n\
         exit_code: {}\n\
         created_at: {created_at}\n\
         \n\
         --- stdout ---\n\
         {}\n\
         --- stderr ---\n\
         {}\n",
        result.exit_code, result.stdout, result.stderr,
    )
}

fn write_once(path: &Path, content: &str) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "report path has no parent"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "report path has no file name"))?;
    let tmp_path = dir.join(format!(".{file_name}.tmp"));

    let write_result = (|| -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, path)?;

        if let Ok(parent_dir) = fs::File::open(dir) {
            let _ = parent_dir.sync_all();
        }
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}
