use crate::constants::{CONTENT_DIR_NAME, DEFAULT_OUTPUT_ROOT, SYMLINK_NAME, TEMP_SYMLINK_NAME};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Where a refresh cycle writes its output.
///
/// Each cycle creates `<content_dir_prefix>-<label>` and
/// `<temp_symlink_prefix>-<label>`, then renames the latter over `symlink`.
/// The staging symlink must live on the same filesystem as `symlink` for the
/// rename to be atomic.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutputPaths {
    /// Prefix of per-cycle content directories.
    pub content_dir_prefix: PathBuf,
    /// Prefix of per-cycle staging symlinks.
    pub temp_symlink_prefix: PathBuf,
    /// The stable path consumers read.
    pub symlink: PathBuf,
}

impl OutputPaths {
    /// Creates output paths from explicit locations.
    pub fn new(
        content_dir_prefix: impl Into<PathBuf>,
        temp_symlink_prefix: impl Into<PathBuf>,
        symlink: impl Into<PathBuf>,
    ) -> Self {
        Self {
            content_dir_prefix: content_dir_prefix.into(),
            temp_symlink_prefix: temp_symlink_prefix.into(),
            symlink: symlink.into(),
        }
    }

    /// Places the standard names under `root`.
    ///
    /// ```
    /// use gce_workload_cert_refresh::OutputPaths;
    /// use std::path::Path;
    ///
    /// let paths = OutputPaths::under("/tmp/creds");
    /// assert_eq!(paths.symlink, Path::new("/tmp/creds/workload-spiffe-credentials"));
    /// assert_eq!(
    ///     paths.content_dir("1"),
    ///     Path::new("/tmp/creds/workload-spiffe-contents-1")
    /// );
    /// ```
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(
            root.join(CONTENT_DIR_NAME),
            root.join(TEMP_SYMLINK_NAME),
            root.join(SYMLINK_NAME),
        )
    }

    /// Returns the content directory for the cycle labelled `label`.
    pub fn content_dir(&self, label: &str) -> PathBuf {
        with_label(&self.content_dir_prefix, label)
    }

    /// Returns the staging symlink for the cycle labelled `label`.
    pub fn temp_symlink(&self, label: &str) -> PathBuf {
        with_label(&self.temp_symlink_prefix, label)
    }
}

impl Default for OutputPaths {
    /// The production locations under `/run/secrets`.
    fn default() -> Self {
        Self::under(DEFAULT_OUTPUT_ROOT)
    }
}

fn with_label(prefix: &Path, label: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push("-");
    name.push(label);
    PathBuf::from(name)
}
