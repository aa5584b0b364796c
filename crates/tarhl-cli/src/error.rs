//! Error conversion utilities for CLI.
//!
//! Converts tarhl-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use std::borrow::Cow;
use std::path::Path;
use tarhl_core::ExtractionError;

/// Human name for the archive source
pub fn archive_label(archive: &Path) -> Cow<'_, str> {
    if archive == Path::new(tarhl_core::api::STDIN_PATH) {
        Cow::Borrowed("<stdin>")
    } else {
        archive.to_string_lossy()
    }
}

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, archive: &Path) -> anyhow::Error {
    let label = archive_label(archive);
    match err {
        ExtractionError::OpenArchive { path, source } => {
            anyhow!("Cannot open archive '{}': {source}", path.display())
        }
        ExtractionError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{label}': {reason}\n\
                 HINT: Only uncompressed tar streams are read. Decompress first, e.g. \
                 `zstd -dc snap.tar.zst | tarhl --file - ...`"
            )
        }
        ExtractionError::StatPair { path, source } => {
            anyhow!(
                "Cannot inspect base file '{}' while extracting '{label}': {source}\n\
                 HINT: Use --write-missing to write files that have no counterpart in the base directory.",
                path.display()
            )
        }
        ExtractionError::HardLink { pair, dest, source } => {
            anyhow!(
                "Cannot hard-link '{}' to '{}': {source}\n\
                 HINT: Base and destination must be on the same filesystem, and the destination \
                 must not already contain the file.",
                pair.display(),
                dest.display()
            )
        }
        ExtractionError::InvalidConfig { reason } => anyhow!("Invalid options: {reason}"),
        _ => anyhow::Error::from(err).context(format!("Error extracting archive '{label}'")),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, archive))
}
