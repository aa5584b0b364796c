//! File metadata snapshots and the same-file test.

use std::fs::Metadata;

use filetime::FileTime;

/// File type bits of a regular file (`S_IFREG`).
pub const MODE_REGULAR: u32 = 0o100_000;

/// Mask selecting permission bits including setuid, setgid and sticky.
pub const MODE_PERMISSION_MASK: u32 = 0o7777;

/// Size, mode and modification time of a file.
///
/// `mode` holds both the file type and the permission bits, in the layout
/// of `st_mode`, so that a regular file recorded in an archive and a
/// regular file found on disk compare equal only when both the type and
/// every permission bit agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMetadata {
    /// File size in bytes.
    pub size: u64,

    /// File type and permission bits.
    pub mode: u32,

    /// Modification time.
    pub mtime: FileTime,
}

impl FileMetadata {
    /// Snapshot for a regular file entry.
    ///
    /// Any type bits present in the recorded header mode are discarded and
    /// replaced by the regular-file type.
    #[must_use]
    pub fn regular(size: u64, header_mode: u32, mtime: FileTime) -> Self {
        Self {
            size,
            mode: MODE_REGULAR | (header_mode & MODE_PERMISSION_MASK),
            mtime,
        }
    }

    /// Permission bits including setuid, setgid and sticky.
    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.mode & MODE_PERMISSION_MASK
    }

    /// Plain `rwx` bits used when creating a file.
    #[must_use]
    pub const fn create_mode(&self) -> u32 {
        self.permissions() & 0o777
    }

    /// Same-file test: size, mode and mtime must all be exactly equal.
    ///
    /// There is no tolerance window on the timestamp and no content
    /// comparison.
    ///
    /// # Examples
    ///
    /// ```
    /// use filetime::FileTime;
    /// use tarhl_core::types::FileMetadata;
    ///
    /// let t = FileTime::from_unix_time(1_700_000_000, 0);
    /// let recorded = FileMetadata::regular(10, 0o644, t);
    ///
    /// assert!(recorded.is_same_file(&FileMetadata::regular(10, 0o644, t)));
    /// assert!(!recorded.is_same_file(&FileMetadata::regular(10, 0o600, t)));
    /// ```
    #[must_use]
    pub fn is_same_file(&self, existing: &Self) -> bool {
        self.size == existing.size && self.mode == existing.mode && self.mtime == existing.mtime
    }
}

impl From<&Metadata> for FileMetadata {
    fn from(metadata: &Metadata) -> Self {
        Self {
            size: metadata.len(),
            mode: st_mode(metadata),
            mtime: FileTime::from_last_modification_time(metadata),
        }
    }
}

#[cfg(unix)]
fn st_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

// Without st_mode only the type and the read-only flag are observable.
#[cfg(not(unix))]
fn st_mode(metadata: &Metadata) -> u32 {
    let file_type = metadata.file_type();
    let type_bits = if file_type.is_file() {
        MODE_REGULAR
    } else if file_type.is_dir() {
        0o040_000
    } else {
        0o120_000
    };
    let permission_bits = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    type_bits | permission_bits
}
