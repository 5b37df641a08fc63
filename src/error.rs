//! Error types for refresh cycles.

use crate::credentials::CredentialError;
use crate::metadata::MetadataError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a refresh cycle.
///
/// Every variant leaves the stable symlink untouched, with two exceptions. A
/// [`FsStep::ReadPublishedSymlink`] or [`FsStep::RemoveSuperseded`] failure
/// happens after the new directory is already published. On the first run,
/// the symlink is created pointing at the new directory before credentials are
/// fetched, so any later failure of that cycle leaves it pointing at a
/// partially populated directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RefreshError {
    /// A credential key could not be fetched from the metadata service.
    #[error("failed to fetch {key}: {source}")]
    Fetch {
        /// The metadata key.
        key: &'static str,
        /// The fetch error.
        #[source]
        source: MetadataError,
    },

    /// The cycle was cancelled while waiting on the metadata service.
    #[error("refresh cancelled while fetching {key}")]
    Cancelled {
        /// The metadata key being fetched.
        key: &'static str,
    },

    /// A payload could not be decoded, resolved, or written.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// A directory or symlink operation failed.
    #[error("failed to {step} {}: {source}", path.display())]
    Filesystem {
        /// The step that failed.
        step: FsStep,
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RefreshError {
    pub(crate) fn fs(step: FsStep, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            step,
            path: path.into(),
            source,
        }
    }
}

/// Filesystem step of a refresh cycle, used to label [`RefreshError::Filesystem`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FsStep {
    /// Creating the cycle's content directory.
    CreateContentDir,
    /// Writing `config_status` into the content directory.
    WriteConfigStatus,
    /// Creating the stable symlink on first run.
    BootstrapSymlink,
    /// Creating the staging symlink.
    StageSymlink,
    /// Renaming the staging symlink over the stable symlink.
    PublishSymlink,
    /// Reading the stable symlink after publishing.
    ReadPublishedSymlink,
    /// Removing the superseded content directory.
    RemoveSuperseded,
}

impl FsStep {
    /// Returns a stable string representation of the step.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateContentDir => "create content directory",
            Self::WriteConfigStatus => "write config status",
            Self::BootstrapSymlink => "create symlink",
            Self::StageSymlink => "create staging symlink",
            Self::PublishSymlink => "rename symlink",
            Self::ReadPublishedSymlink => "read symlink",
            Self::RemoveSuperseded => "remove superseded directory",
        }
    }
}

impl fmt::Display for FsStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filesystem_error_names_step_and_path() {
        let err = RefreshError::fs(
            FsStep::PublishSymlink,
            "/run/secrets/workload-spiffe-credentials",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );

        let message = err.to_string();
        assert!(message.starts_with(
            "failed to rename symlink /run/secrets/workload-spiffe-credentials: "
        ));
    }

    #[test]
    fn test_fetch_error_names_key() {
        let err = RefreshError::Fetch {
            key: "instance/gce-workload-certificates/trust-anchors",
            source: MetadataError::NotFound {
                key: "instance/gce-workload-certificates/trust-anchors".to_string(),
            },
        };

        assert!(err
            .to_string()
            .starts_with("failed to fetch instance/gce-workload-certificates/trust-anchors"));
    }
}
