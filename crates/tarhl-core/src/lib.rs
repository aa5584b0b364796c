//! Tar extraction that hard-links unchanged files against a base tree.
//!
//! `tarhl-core` restores a tar stream into a destination directory. When a
//! base directory is configured, every regular file whose counterpart in
//! the base tree has the same size, mode and modification time becomes a
//! hard link to that counterpart instead of a fresh copy. Restoring a
//! series of similar snapshots therefore costs only the changed files.
//!
//! The pipeline has two stages joined by a bounded queue:
//!
//! - [`walker::ArchiveWalker`] decodes headers, creates directories and
//!   symlinks, and queues regular files.
//! - [`writer::FileWriter`] drains the queue on its own thread and links or
//!   writes each file in archive order.
//!
//! # Examples
//!
//! ```no_run
//! use tarhl_core::ExtractConfig;
//! use tarhl_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = std::fs::File::open("monday.tar")?;
//! let config = ExtractConfig::new("/restore/monday").with_base("/restore/sunday");
//! let report = extract_archive(archive, &config)?;
//! println!("{}", report.summary_line());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod queue;
pub mod report;
#[doc(hidden)]
pub mod test_utils;
pub mod types;
pub mod walker;
pub mod writer;

pub use api::extract_archive;
pub use api::extract_archive_file;
pub use api::extract_archive_with_progress;
pub use api::open_archive;
pub use config::ExtractConfig;
pub use config::MissingBasePolicy;
pub use error::ExtractionError;
pub use error::Result;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

pub use types::EntryKind;
pub use types::FileMetadata;
