//! Value types shared by the archive walker and the file writer.
//!
//! - [`EntryKind`]: classification of a decoded tar header
//! - [`EntryPath`]: archive-relative name, lexically normalized
//! - [`FileMetadata`]: the size, mode and mtime snapshot used by the
//!   same-file test

pub mod entry_path;
pub mod entry_type;
pub mod metadata;

pub use entry_path::EntryPath;
pub use entry_type::EntryKind;
pub use metadata::FileMetadata;
