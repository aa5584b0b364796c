//! File writer: the single consumer of the write-request queue.
//!
//! The writer runs on its own thread and handles requests strictly in the
//! order the walker submitted them. For each request it either hard-links
//! an identical file from the base tree or writes the archive content and
//! restores the recorded timestamp. The first error stops the writer; the
//! queue receiver is dropped with it, so the walker notices on its next
//! submit.

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::thread::JoinHandle;

use tracing::debug;

use crate::ExtractionError;
use crate::Result;
use crate::config::MissingBasePolicy;
use crate::queue::RequestReceiver;
use crate::queue::WriteRequest;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::types::FileMetadata;

/// How a single request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Content was written to a fresh file.
    Written,
    /// The destination was hard-linked to the pairing file.
    Linked,
}

/// Counters owned by the writer and handed back when it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Files written with fresh content.
    pub files_written: usize,
    /// Files hard-linked from the base tree.
    pub files_linked: usize,
    /// Content bytes written.
    pub bytes_written: u64,
    /// Content bytes avoided through hard links.
    pub bytes_linked: u64,
}

/// Consumer that turns write requests into files.
pub struct FileWriter {
    missing_base: MissingBasePolicy,
    progress: Box<dyn ProgressCallback>,
    stats: WriterStats,
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("missing_base", &self.missing_base)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for FileWriter {
    fn default() -> Self {
        Self::new(MissingBasePolicy::Fail, Box::new(NoopProgress))
    }
}

impl FileWriter {
    /// Creates a writer with the given missing-pair policy and progress sink.
    #[must_use]
    pub fn new(missing_base: MissingBasePolicy, progress: Box<dyn ProgressCallback>) -> Self {
        Self {
            missing_base,
            progress,
            stats: WriterStats::default(),
        }
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Starts the writer on a dedicated thread draining `receiver`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(self, receiver: RequestReceiver) -> Result<WriterHandle> {
        let handle = thread::Builder::new()
            .name("file-writer".into())
            .spawn(move || self.run(receiver))?;
        Ok(WriterHandle { handle })
    }

    /// Drains the queue until it is closed and empty, or aborted by the
    /// walker.
    ///
    /// Stops at the first failing request and returns its error.
    pub fn run(mut self, receiver: RequestReceiver) -> Result<WriterStats> {
        for request in receiver.iter() {
            self.process(request)?;
        }
        self.progress.on_complete();
        if receiver.is_aborted() {
            debug!(
                written = self.stats.files_written,
                linked = self.stats.files_linked,
                "write queue aborted"
            );
        } else {
            debug!(
                written = self.stats.files_written,
                linked = self.stats.files_linked,
                "write queue drained"
            );
        }
        Ok(self.stats)
    }

    /// Resolves one request by linking or writing.
    pub fn process(&mut self, request: WriteRequest) -> Result<WriteOutcome> {
        let WriteRequest {
            dest,
            pair,
            content,
            metadata,
        } = request;

        if let Some(pair) = pair.as_deref()
            && self.matches_pair(pair, &metadata)?
        {
            link_file(pair, &dest)?;
            self.stats.files_linked += 1;
            self.stats.bytes_linked += metadata.size;
            self.progress.on_file_linked(&dest, metadata.size);
            debug!(dest = %dest.display(), pair = %pair.display(), "linked");
            return Ok(WriteOutcome::Linked);
        }

        write_file(&dest, &content, &metadata)?;
        let bytes = content.len() as u64;
        self.stats.files_written += 1;
        self.stats.bytes_written += bytes;
        self.progress.on_file_written(&dest, bytes);
        debug!(dest = %dest.display(), bytes, "written");
        Ok(WriteOutcome::Written)
    }

    /// Stats the pairing path and applies the same-file test.
    fn matches_pair(&self, pair: &Path, recorded: &FileMetadata) -> Result<bool> {
        match fs::symlink_metadata(pair) {
            Ok(existing) => Ok(recorded.is_same_file(&FileMetadata::from(&existing))),
            Err(source)
                if source.kind() == io::ErrorKind::NotFound
                    && self.missing_base == MissingBasePolicy::WriteFresh =>
            {
                debug!(pair = %pair.display(), "no base file, writing fresh");
                Ok(false)
            }
            Err(source) => Err(ExtractionError::StatPair {
                path: pair.to_path_buf(),
                source,
            }),
        }
    }
}

/// Handle to a running writer thread.
///
/// Joining it is the completion signal: [`WriterHandle::finish`] returns
/// once the queue has been closed and drained, or the writer failed.
#[derive(Debug)]
pub struct WriterHandle {
    handle: JoinHandle<Result<WriterStats>>,
}

impl WriterHandle {
    /// Waits for the writer to finish and returns its counters.
    pub fn finish(self) -> Result<WriterStats> {
        self.handle
            .join()
            .map_err(|_| ExtractionError::WriterPanicked)?
    }
}

fn link_file(pair: &Path, dest: &Path) -> Result<()> {
    fs::hard_link(pair, dest).map_err(|source| ExtractionError::HardLink {
        pair: pair.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    })
}

/// Writes `content` to `dest` with the recorded permission bits, then sets
/// both access and modification time to the recorded mtime.
fn write_file(dest: &Path, content: &[u8], metadata: &FileMetadata) -> Result<()> {
    let write_err = |source| ExtractionError::WriteFile {
        path: dest.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(metadata.create_mode());
    }

    let mut file = options.open(dest).map_err(write_err)?;
    file.write_all(content).map_err(write_err)?;

    // Creation mode is filtered by the umask, and an existing file keeps
    // its old mode; set the recorded bits explicitly.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(metadata.create_mode()))
            .map_err(write_err)?;
    }
    drop(file);

    filetime::set_file_times(dest, metadata.mtime, metadata.mtime).map_err(|source| {
        ExtractionError::SetTimes {
            path: dest.to_path_buf(),
            source,
        }
    })
}
