//! Extraction configuration.

use std::path::Path;
use std::path::PathBuf;

use crate::ExtractionError;
use crate::Result;

/// Default number of pending write requests the queue holds before the
/// archive walker blocks.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// What the file writer does when a pairing path cannot be found in the
/// base tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingBasePolicy {
    /// Abort the extraction on any stat failure of a pairing path.
    #[default]
    Fail,

    /// Treat a missing pairing file as "no candidate" and write the
    /// content fresh. Stat failures other than `NotFound` still abort.
    WriteFresh,
}

/// Configuration for a single extraction run.
///
/// # Examples
///
/// ```
/// use tarhl_core::ExtractConfig;
///
/// let config = ExtractConfig::new("/restore/today").with_base("/restore/yesterday");
/// assert_eq!(config.queue_capacity, 100);
/// assert!(config.base.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Root directory the archive is extracted into.
    pub dest: PathBuf,

    /// Root directory searched for hard-link candidates. `None` disables
    /// deduplication.
    pub base: Option<PathBuf>,

    /// Capacity of the bounded queue between walker and writer.
    pub queue_capacity: usize,

    /// Behaviour when a pairing path does not exist.
    pub missing_base: MissingBasePolicy,
}

impl Default for ExtractConfig {
    /// Extracts into the current directory without a base tree.
    fn default() -> Self {
        Self {
            dest: PathBuf::from("."),
            base: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            missing_base: MissingBasePolicy::Fail,
        }
    }
}

impl ExtractConfig {
    /// Creates a configuration extracting into `dest`.
    #[must_use]
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            ..Default::default()
        }
    }

    /// Sets the base tree. An empty path disables deduplication.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        self.base = if base.as_os_str().is_empty() {
            None
        } else {
            Some(base)
        };
        self
    }

    /// Sets the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the missing pairing file policy.
    #[must_use]
    pub fn with_missing_base(mut self, policy: MissingBasePolicy) -> Self {
        self.missing_base = policy;
        self
    }

    /// Returns the base tree root, if deduplication is enabled.
    #[must_use]
    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Checks that the configuration can drive an extraction.
    pub fn validate(&self) -> Result<()> {
        if self.dest.as_os_str().is_empty() {
            return Err(ExtractionError::InvalidConfig {
                reason: "destination directory must not be empty".into(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ExtractionError::InvalidConfig {
                reason: "queue capacity must be at least 1".into(),
            });
        }
        Ok(())
    }
}
