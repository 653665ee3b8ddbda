use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report not found: {id}")]
    NotFound { id: String },

    #[error("report IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::NotFound { .. } => "not_found",
            ReportError::Io(_) => "io",
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
