//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use tarhl_core::ExtractionReport;

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct ExtractionOutput {
    files_written: usize,
    files_linked: usize,
    directories_created: usize,
    symlinks_created: usize,
    entries_skipped: usize,
    bytes_written: u64,
    bytes_linked: u64,
    duration_ms: u128,
}

impl From<&ExtractionReport> for ExtractionOutput {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            files_written: report.files_written,
            files_linked: report.files_linked,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            bytes_linked: report.bytes_linked,
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        let output = JsonOutput::success(ExtractionOutput::from(report));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::failure(format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
