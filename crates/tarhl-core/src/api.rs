//! High-level public API for extraction.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::ExtractConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::Result;
use crate::queue::write_queue;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::walker::ArchiveWalker;
use crate::writer::FileWriter;

/// Path that selects standard input as the archive source.
pub const STDIN_PATH: &str = "-";

/// Opens an archive source: standard input for `-`, a buffered file
/// otherwise.
///
/// # Errors
///
/// Returns [`ExtractionError::OpenArchive`] if the file cannot be opened.
pub fn open_archive(path: &Path) -> Result<Box<dyn Read>> {
    if path == Path::new(STDIN_PATH) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|source| ExtractionError::OpenArchive {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(BufReader::new(file)))
}

/// Extracts a tar stream into `config.dest`.
///
/// Regular files whose counterpart under `config.base` has the same size,
/// mode and modification time are hard-linked instead of written.
///
/// # Errors
///
/// Returns the first error hit by either the archive walker or the file
/// writer. Output produced before the error is left in place.
///
/// # Examples
///
/// ```no_run
/// use tarhl_core::ExtractConfig;
/// use tarhl_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = std::fs::File::open("snapshot.tar")?;
/// let config = ExtractConfig::new("/restore/today").with_base("/restore/yesterday");
/// let report = extract_archive(archive, &config)?;
/// println!("{}", report.summary_line());
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<R: Read>(reader: R, config: &ExtractConfig) -> Result<ExtractionReport> {
    extract_archive_with_progress(reader, config, Box::new(NoopProgress))
}

/// Extracts a tar stream, reporting each written or linked file to
/// `progress` from the writer thread.
///
/// # Errors
///
/// Same as [`extract_archive`].
pub fn extract_archive_with_progress<R: Read>(
    reader: R,
    config: &ExtractConfig,
    progress: Box<dyn ProgressCallback>,
) -> Result<ExtractionReport> {
    config.validate()?;
    let start = Instant::now();
    prepare_destination(&config.dest)?;

    info!(
        dest = %config.dest.display(),
        base = ?config.base(),
        queue_capacity = config.queue_capacity,
        "extraction started"
    );

    let (sender, receiver) = write_queue(config.queue_capacity);
    let writer = FileWriter::new(config.missing_base, progress).spawn(receiver)?;
    let walked = ArchiveWalker::new(&config.dest, config.base()).walk(reader, sender);
    let written = writer.finish();

    // A writer failure makes the walker's next submit fail; report the cause.
    let (walk, write) = match (walked, written) {
        (Ok(walk), Ok(write)) => (walk, write),
        (Ok(_) | Err(ExtractionError::WriterDisconnected), Err(err)) | (Err(err), _) => {
            return Err(err);
        }
    };
    debug_assert_eq!(walk.files_queued, write.files_written + write.files_linked);

    let report = ExtractionReport {
        files_written: write.files_written,
        files_linked: write.files_linked,
        directories_created: walk.directories_created,
        symlinks_created: walk.symlinks_created,
        entries_skipped: walk.entries_skipped,
        bytes_written: write.bytes_written,
        bytes_linked: write.bytes_linked,
        duration: start.elapsed(),
    };
    info!(
        written = report.files_written,
        linked = report.files_linked,
        bytes_written = report.bytes_written,
        elapsed_ms = u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
        "extraction finished"
    );
    Ok(report)
}

/// Opens `archive_path` (or standard input for `-`) and extracts it.
///
/// # Errors
///
/// Same as [`extract_archive`], plus failure to open the archive.
pub fn extract_archive_file(
    archive_path: &Path,
    config: &ExtractConfig,
    progress: Box<dyn ProgressCallback>,
) -> Result<ExtractionReport> {
    let reader = open_archive(archive_path)?;
    extract_archive_with_progress(reader, config, progress)
}

/// Creates the output root and any missing parents.
fn prepare_destination(dest: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(dest)
        .map_err(|source| ExtractionError::CreateDirectory {
            path: dest.to_path_buf(),
            source,
        })
}
