//! Progress spinner for extraction runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use std::time::Duration;
use tarhl_core::ProgressCallback;

/// CLI spinner implementing `ProgressCallback`.
///
/// A tar stream carries no entry count up front, so progress is shown as a
/// running tally of written and linked files alongside the bytes handled.
pub struct CliProgress {
    bar: ProgressBar,
    written: usize,
    linked: usize,
}

impl CliProgress {
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template(
                    "{spinner} {prefix} {msg} [{binary_bytes}, {binary_bytes_per_sec}, {elapsed}]",
                )
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(120));

        let progress = Self {
            bar,
            written: 0,
            linked: 0,
        };
        progress.refresh();
        progress
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    fn message(&self) -> String {
        format!("written {}, linked {}", self.written, self.linked)
    }

    fn refresh(&self) {
        self.bar.set_message(self.message());
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_file_written(&mut self, _path: &Path, bytes: u64) {
        self.written += 1;
        self.bar.inc(bytes);
        self.refresh();
    }

    fn on_file_linked(&mut self, _path: &Path, bytes: u64) {
        self.linked += 1;
        self.bar.inc(bytes);
        self.refresh();
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}
