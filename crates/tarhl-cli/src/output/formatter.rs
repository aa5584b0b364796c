//! Output formatter trait and the JSON result envelope.

use anyhow::Result;
use serde::Serialize;
use tarhl_core::ExtractionReport;

/// Renders the outcome of a run.
pub trait OutputFormatter {
    /// Report a finished extraction on stdout.
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Report a fatal error. Shown even in quiet mode.
    fn format_error(&self, error: &anyhow::Error);
}

/// JSON envelope: `{"operation": "extract", "status": ..., "data"|"error": ...}`
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    operation: &'static str,
    #[serde(flatten)]
    outcome: Outcome<T>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Outcome<T> {
    Success { data: T },
    Error { error: String },
}

impl<T> JsonOutput<T> {
    pub const fn success(data: T) -> Self {
        Self {
            operation: "extract",
            outcome: Outcome::Success { data },
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            operation: "extract",
            outcome: Outcome::Error {
                error: error.into(),
            },
        }
    }
}
