//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use tarhl_core::ExtractionReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    out: Term,
    err: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled_stderr(),
            out: Term::stdout(),
            err: Term::stderr(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn detail_lines(report: &ExtractionReport) -> Vec<String> {
        vec![
            format!("  Directories:   {}", report.directories_created),
            format!("  Symlinks:      {}", report.symlinks_created),
            format!("  Skipped:       {}", report.entries_skipped),
            format!("  Bytes written: {}", Self::format_size(report.bytes_written)),
            format!("  Bytes linked:  {}", Self::format_size(report.bytes_linked)),
            format!("  Duration:      {:.2?}", report.duration),
            format!(
                "  Throughput:    {}/s",
                Self::format_size(report.throughput() as u64)
            ),
        ]
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.out.write_line(&report.summary_line())?;
        if self.verbose {
            for line in Self::detail_lines(report) {
                self.out.write_line(&line)?;
            }
        }
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            let _ = self
                .err
                .write_line(&format!("{} {error:?}", style("Error:").red().bold()));
        } else {
            let _ = self.err.write_line(&format!("Error: {error:?}"));
        }
    }
}
