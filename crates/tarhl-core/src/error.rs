//! Error types for the extraction pipeline.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors that can occur while extracting an archive.
///
/// Every variant is fatal: the pipeline stops at the first error and
/// leaves whatever was already written or linked in place.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed outside of a specific filesystem step.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive file could not be opened.
    #[error("failed to open archive {path}: {source}")]
    OpenArchive {
        /// Archive path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Archive stream is corrupted or a header could not be decoded.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Directory entry could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Destination directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Symlink entry could not be created.
    #[error("failed to create symlink {path} -> {target}: {source}")]
    CreateSymlink {
        /// Destination link path.
        path: PathBuf,
        /// Recorded link target.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Pairing file in the base tree could not be inspected.
    #[error("failed to stat base file {path}: {source}")]
    StatPair {
        /// Pairing path in the base tree.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Hard link from the base tree to the destination failed.
    #[error("failed to link {pair} to {dest}: {source}")]
    HardLink {
        /// Existing file in the base tree.
        pair: PathBuf,
        /// Destination path of the new link.
        dest: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// File content could not be written.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// Destination file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Timestamps could not be applied to a written file.
    #[error("failed to set times on {path}: {source}")]
    SetTimes {
        /// Destination file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file writer stopped accepting requests.
    #[error("file writer stopped before the archive was fully read")]
    WriterDisconnected,

    /// The file writer thread panicked.
    #[error("file writer thread panicked")]
    WriterPanicked,

    /// Configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

impl ExtractionError {
    /// Returns `true` if this error came from a filesystem mutation or
    /// inspection on the destination or base tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use tarhl_core::ExtractionError;
    ///
    /// let err = ExtractionError::WriteFile {
    ///     path: PathBuf::from("out/a.txt"),
    ///     source: std::io::Error::other("disk full"),
    /// };
    /// assert!(err.is_filesystem_error());
    ///
    /// let err = ExtractionError::InvalidArchive("bad header".into());
    /// assert!(!err.is_filesystem_error());
    /// ```
    #[must_use]
    pub const fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            Self::CreateDirectory { .. }
                | Self::CreateSymlink { .. }
                | Self::StatPair { .. }
                | Self::HardLink { .. }
                | Self::WriteFile { .. }
                | Self::SetTimes { .. }
        )
    }

    /// Returns the path the failing operation was acting on, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::OpenArchive { path, .. }
            | Self::CreateDirectory { path, .. }
            | Self::CreateSymlink { path, .. }
            | Self::StatPair { path, .. }
            | Self::WriteFile { path, .. }
            | Self::SetTimes { path, .. } => Some(path),
            Self::HardLink { dest, .. } => Some(dest),
            _ => None,
        }
    }
}
