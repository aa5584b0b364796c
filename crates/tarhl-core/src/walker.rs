//! Archive walker: the producer side of the pipeline.
//!
//! The walker decodes tar headers in stream order. Directories and symlinks
//! are created on the spot; regular files are read fully into memory and
//! handed to the file writer through the bounded queue. Other entry types
//! are skipped.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

use filetime::FileTime;
use tracing::debug;

use crate::ExtractionError;
use crate::Result;
use crate::queue::RequestSender;
use crate::queue::WriteRequest;
use crate::types::EntryKind;
use crate::types::EntryPath;
use crate::types::FileMetadata;

/// Upper bound on the up-front allocation for one file's content. Larger
/// files still load completely, the buffer just grows while reading.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Counters owned by the walker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directory entries created.
    pub directories_created: usize,
    /// Symlink entries created.
    pub symlinks_created: usize,
    /// Regular files handed to the writer.
    pub files_queued: usize,
    /// Entries of other types that were skipped.
    pub entries_skipped: usize,
    /// Content bytes read from the archive.
    pub bytes_read: u64,
}

/// Sequential reader of a tar stream.
#[derive(Debug)]
pub struct ArchiveWalker<'a> {
    dest: &'a Path,
    base: Option<&'a Path>,
    stats: WalkStats,
}

impl<'a> ArchiveWalker<'a> {
    /// Creates a walker extracting under `dest`, pairing regular files with
    /// the same relative path under `base` when one is given.
    #[must_use]
    pub fn new(dest: &'a Path, base: Option<&'a Path>) -> Self {
        Self {
            dest,
            base,
            stats: WalkStats::default(),
        }
    }

    /// Walks the whole archive, then closes the queue.
    ///
    /// End of stream is normal termination. A decode error, a failed
    /// directory or symlink creation, or a writer that stopped accepting
    /// requests ends the walk with an error and aborts the queue, so the
    /// writer drops the requests it has not started yet.
    pub fn walk<R: Read>(mut self, reader: R, queue: RequestSender) -> Result<WalkStats> {
        match self.visit_all(reader, &queue) {
            Ok(()) => {
                queue.close();
                Ok(self.stats)
            }
            Err(err) => {
                queue.abort();
                Err(err)
            }
        }
    }

    fn visit_all<R: Read>(&mut self, reader: R, queue: &RequestSender) -> Result<()> {
        let mut archive = tar::Archive::new(reader);
        for entry in archive.entries().map_err(archive_error)? {
            let mut entry = entry.map_err(archive_error)?;
            self.visit(&mut entry, queue)?;
        }
        Ok(())
    }

    fn visit<R: Read>(
        &mut self,
        entry: &mut tar::Entry<'_, R>,
        queue: &RequestSender,
    ) -> Result<()> {
        let name = EntryPath::new(&entry.path().map_err(archive_error)?);
        let link_name = entry
            .link_name()
            .map_err(archive_error)?
            .map(Cow::into_owned);

        match EntryKind::classify(entry.header().entry_type(), link_name) {
            EntryKind::Directory => {
                let mode = entry.header().mode().map_err(archive_error)?;
                self.create_directory(&name, mode)
            }
            EntryKind::Symlink { target } => self.create_symlink(&name, &target),
            EntryKind::File => self.queue_file(entry, &name, queue),
            EntryKind::Other => {
                self.stats.entries_skipped += 1;
                Ok(())
            }
        }
    }

    fn create_directory(&mut self, name: &EntryPath, mode: u32) -> Result<()> {
        let path = name.join_to(self.dest);

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode & 0o777);
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder
            .create(&path)
            .map_err(|source| ExtractionError::CreateDirectory {
                path: path.clone(),
                source,
            })?;

        self.stats.directories_created += 1;
        debug!(path = %path.display(), "directory created");
        Ok(())
    }

    fn create_symlink(&mut self, name: &EntryPath, target: &Path) -> Result<()> {
        let path = name.join_to(self.dest);
        symlink(target, &path).map_err(|source| ExtractionError::CreateSymlink {
            path: path.clone(),
            target: target.to_path_buf(),
            source,
        })?;

        self.stats.symlinks_created += 1;
        debug!(path = %path.display(), target = %target.display(), "symlink created");
        Ok(())
    }

    fn queue_file<R: Read>(
        &mut self,
        entry: &mut tar::Entry<'_, R>,
        name: &EntryPath,
        queue: &RequestSender,
    ) -> Result<()> {
        let size = entry.size();
        let mode = entry.header().mode().map_err(archive_error)?;
        let mtime = recorded_mtime(entry)?;

        let mut content =
            Vec::with_capacity(usize::try_from(size.min(MAX_PREALLOC)).unwrap_or(0));
        entry.read_to_end(&mut content).map_err(archive_error)?;
        if content.len() as u64 != size {
            return Err(ExtractionError::InvalidArchive(format!(
                "{}: expected {size} bytes, read {}",
                name.as_path().display(),
                content.len()
            )));
        }

        let request = WriteRequest {
            dest: name.join_to(self.dest),
            pair: self.base.map(|base| name.join_to(base)),
            content,
            metadata: FileMetadata::regular(size, mode, mtime),
        };
        debug!(dest = %request.dest.display(), size, pending = queue.pending(), "file queued");
        queue.submit(request)?;

        self.stats.files_queued += 1;
        self.stats.bytes_read += size;
        Ok(())
    }
}

/// Modification time of an entry. A PAX `mtime` record wins over the
/// header field since it can carry sub-second precision.
fn recorded_mtime<R: Read>(entry: &mut tar::Entry<'_, R>) -> Result<FileTime> {
    if let Some(extensions) = entry.pax_extensions().map_err(archive_error)? {
        for extension in extensions {
            let extension = extension.map_err(archive_error)?;
            if extension.key().ok() == Some("mtime")
                && let Some(mtime) = extension.value().ok().and_then(parse_pax_time)
            {
                return Ok(mtime);
            }
        }
    }

    let secs = entry.header().mtime().map_err(archive_error)?;
    Ok(FileTime::from_unix_time(
        i64::try_from(secs).unwrap_or(i64::MAX),
        0,
    ))
}

/// Parses a PAX timestamp such as `1700000000.25` or `-1.5`.
fn parse_pax_time(value: &str) -> Option<FileTime> {
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: i64 = whole.parse().ok()?;

    let digits: String = fraction.chars().take(9).collect();
    let nanos = if digits.is_empty() {
        0
    } else {
        format!("{digits:0<9}").parse::<u32>().ok()?
    };

    if nanos > 0 && whole.starts_with('-') {
        Some(FileTime::from_unix_time(secs - 1, 1_000_000_000 - nanos))
    } else {
        Some(FileTime::from_unix_time(secs, nanos))
    }
}

/// Maps a tar decoding failure to an archive error, keeping genuine I/O
/// failures of the underlying stream as I/O errors.
fn archive_error(err: io::Error) -> ExtractionError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof | io::ErrorKind::Other => {
            ExtractionError::InvalidArchive(err.to_string())
        }
        _ => ExtractionError::Io(err),
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
