//! Extraction reporting.

use std::path::Path;
use std::time::Duration;

/// Report of an extraction run.
///
/// Walker counters (directories, symlinks, skipped entries) and writer
/// counters (written, linked, bytes) are gathered separately and merged
/// once the writer has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Regular files written with fresh content.
    pub files_written: usize,

    /// Regular files hard-linked from the base tree.
    pub files_linked: usize,

    /// Directory entries created.
    pub directories_created: usize,

    /// Symlink entries created.
    pub symlinks_created: usize,

    /// Entries of unsupported types that were skipped.
    pub entries_skipped: usize,

    /// Content bytes written to disk.
    pub bytes_written: u64,

    /// Content bytes that were satisfied by a hard link instead of a write.
    pub bytes_linked: u64,

    /// Wall-clock duration of the extraction.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of regular-file entries handled.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.files_written + self.files_linked
    }

    /// Returns the write throughput in bytes per second.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.bytes_written as f64 / secs
        } else {
            0.0
        }
    }

    /// Returns the one-line summary printed at the end of a run.
    ///
    /// ```
    /// use tarhl_core::ExtractionReport;
    ///
    /// let report = ExtractionReport {
    ///     files_written: 3,
    ///     files_linked: 7,
    ///     ..Default::default()
    /// };
    /// assert_eq!(report.summary_line(), "Written: 3 files, linked: 7 files");
    /// ```
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "Written: {} files, linked: {} files",
            self.files_written, self.files_linked
        )
    }
}

/// Callback trait for progress reporting from the file writer.
///
/// The writer runs on its own thread, so implementations must be `Send`.
pub trait ProgressCallback: Send {
    /// Called after a file was written with fresh content.
    fn on_file_written(&mut self, path: &Path, bytes: u64);

    /// Called after a file was hard-linked from the base tree.
    fn on_file_linked(&mut self, path: &Path, bytes: u64);

    /// Called once the queue is drained.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_file_written(&mut self, _path: &Path, _bytes: u64) {}

    fn on_file_linked(&mut self, _path: &Path, _bytes: u64) {}

    fn on_complete(&mut self) {}
}
