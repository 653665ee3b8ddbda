//! Immutable per-execution reports.
//!
//! Each report is rendered once, written to a hidden temp file, synced and
//! renamed into place as `<uuid>.txt`. Readers either see the full record or
//! nothing.

mod error;
mod sink;

pub use error::{ReportError, ReportResult};
pub use sink::{render_report, ReportId, ReportSink};
