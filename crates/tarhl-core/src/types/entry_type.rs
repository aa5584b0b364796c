//! Archive entry classification.

use std::path::PathBuf;

/// Kind of entry decoded from an archive header.
///
/// Only regular files, directories and symlinks are extracted. Everything
/// else (hard links, device nodes, FIFOs, ...) maps to [`EntryKind::Other`]
/// and is skipped without a write or a log line.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use tarhl_core::types::EntryKind;
///
/// let kind = EntryKind::classify(tar::EntryType::Symlink, Some(PathBuf::from("target")));
/// assert!(matches!(kind, EntryKind::Symlink { .. }));
///
/// let kind = EntryKind::classify(tar::EntryType::Fifo, None);
/// assert_eq!(kind, EntryKind::Other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,

    /// Symbolic link entry.
    Symlink {
        /// The recorded link target, used verbatim.
        target: PathBuf,
    },

    /// Any other entry type.
    Other,
}

impl EntryKind {
    /// Classifies a tar entry type.
    ///
    /// A symlink header without a link name is classified as
    /// [`EntryKind::Other`] since there is nothing to point at.
    #[must_use]
    pub fn classify(entry_type: tar::EntryType, link_name: Option<PathBuf>) -> Self {
        match entry_type {
            tar::EntryType::Regular => Self::File,
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Symlink => {
                link_name.map_or(Self::Other, |target| Self::Symlink { target })
            }
            _ => Self::Other,
        }
    }
}
