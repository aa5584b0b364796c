//! Archive-relative entry names.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// An archive entry name, lexically normalized so it can be joined onto
/// the destination root and the base root alike.
///
/// Normalization mirrors a lexical path clean:
/// - root and `.` components are dropped
/// - `..` removes the previous component and never climbs above the root
///   the name is later joined to
///
/// No filesystem access happens here; symlinks already extracted under the
/// destination are not resolved.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tarhl_core::types::EntryPath;
///
/// let name = EntryPath::new(Path::new("./a/b/../x.txt"));
/// assert_eq!(name.as_path(), Path::new("a/x.txt"));
/// assert_eq!(name.join_to(Path::new("/restore")), Path::new("/restore/a/x.txt"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPath(PathBuf);

impl EntryPath {
    /// Normalizes a raw entry name.
    #[must_use]
    pub fn new(name: &Path) -> Self {
        let mut normalized = PathBuf::new();
        for component in name.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::ParentDir => {
                    normalized.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        Self(normalized)
    }

    /// Returns the normalized relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns `true` if the name normalized to the root itself (`./`).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Joins this name onto `root`.
    #[must_use]
    pub fn join_to(&self, root: &Path) -> PathBuf {
        if self.is_root() {
            root.to_path_buf()
        } else {
            root.join(&self.0)
        }
    }
}

impl AsRef<Path> for EntryPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        let name = EntryPath::new(Path::new("a/b/c.txt"));
        assert_eq!(name.as_path(), Path::new("a/b/c.txt"));
    }

    #[test]
    fn test_trailing_slash_directory() {
        let name = EntryPath::new(Path::new("a/"));
        assert_eq!(name.as_path(), Path::new("a"));
    }

    #[test]
    fn test_leading_slash_and_dot_dropped() {
        assert_eq!(
            EntryPath::new(Path::new("/etc/hosts")).as_path(),
            Path::new("etc/hosts")
        );
        assert_eq!(
            EntryPath::new(Path::new("./etc/./hosts")).as_path(),
            Path::new("etc/hosts")
        );
    }

    #[test]
    fn test_parent_dir_clamped_at_root() {
        assert_eq!(
            EntryPath::new(Path::new("../../x")).as_path(),
            Path::new("x")
        );
        assert_eq!(
            EntryPath::new(Path::new("a/../../b/c")).as_path(),
            Path::new("b/c")
        );
    }

    #[test]
    fn test_root_entry() {
        let name = EntryPath::new(Path::new("./"));
        assert!(name.is_root());
        assert_eq!(name.join_to(Path::new("out")), PathBuf::from("out"));
    }

    #[test]
    fn test_join_to_dest_and_base() {
        let name = EntryPath::new(Path::new("a/x.txt"));
        assert_eq!(name.join_to(Path::new("dest")), PathBuf::from("dest/a/x.txt"));
        assert_eq!(name.join_to(Path::new("base")), PathBuf::from("base/a/x.txt"));
    }
}
