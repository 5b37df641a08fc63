//! Refresh cycle: gate, config-status mirror, population of a new content
//! directory, atomic publish, and cleanup of the superseded directory.
//!
//! A cycle either publishes a fully populated directory or leaves the stable
//! symlink exactly as it was. Each call to
//! [`CredentialRefresher::refresh_creds`] is independent, so invoking it on a
//! schedule heals any earlier failure.
//!
//! A failed cycle does not remove the directory it had started to populate.
//!
//! The refresher does no locking. Running two cycles concurrently against the
//! same [`OutputPaths`] is not supported.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "metadata-client")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use gce_workload_cert_refresh::{CredentialRefresher, MetadataClient, RefreshOutcome};
//!
//! let refresher = CredentialRefresher::builder(MetadataClient::new()?).build();
//!
//! match refresher.refresh_creds().await? {
//!     RefreshOutcome::Published(publication) => {
//!         println!("now serving {}", publication.spiffe_id);
//!     }
//!     RefreshOutcome::Disabled | RefreshOutcome::Unconfigured => {}
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod gate;
mod paths;
mod publish;

pub use builder::CredentialRefresherBuilder;
pub use gate::{fetch_config_status, is_enabled};
pub use paths::OutputPaths;

use crate::clock::{Clock, SystemClock};
use crate::constants::{TRUST_ANCHORS_KEY, WORKLOAD_IDENTITIES_KEY};
use crate::credentials::{write_trust_anchors, write_workload_identities};
use crate::error::RefreshError;
use crate::metadata::MetadataFetcher;
use crate::prelude::{debug, info, warn};
use crate::spiffe_id::SpiffeId;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Result of a refresh cycle that did not fail.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RefreshOutcome {
    /// The instance has not opted in; nothing was done.
    Disabled,
    /// The config status could not be fetched; nothing was written.
    Unconfigured,
    /// A new content directory was published.
    Published(Publication),
}

/// Details of a published content directory.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Publication {
    /// The directory the stable symlink now points at.
    pub content_dir: PathBuf,
    /// The workload identity written into it.
    pub spiffe_id: SpiffeId,
    /// The previously live directory, if one was removed.
    pub superseded: Option<PathBuf>,
}

/// Rotates workload credentials into [`OutputPaths`].
///
/// Built with [`CredentialRefresher::builder`]. The metadata fetcher and the
/// clock are explicit collaborators, so tests can substitute both.
#[derive(Debug)]
pub struct CredentialRefresher<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    paths: OutputPaths,
    cancel: CancellationToken,
}

impl<F: MetadataFetcher> CredentialRefresher<F, SystemClock> {
    /// Returns a builder using `fetcher`, the system clock, and the default output paths.
    pub fn builder(fetcher: F) -> CredentialRefresherBuilder<F, SystemClock> {
        CredentialRefresherBuilder::new(fetcher)
    }
}

impl<F: MetadataFetcher, C: Clock> CredentialRefresher<F, C> {
    /// Returns the paths this refresher writes to.
    pub fn output_paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Returns the token that cancels in-flight metadata requests.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs one refresh cycle.
    ///
    /// Returns [`RefreshOutcome::Disabled`] or [`RefreshOutcome::Unconfigured`]
    /// without touching the filesystem when the gate is closed or the config
    /// status is unavailable. Otherwise, a new content directory is populated and
    /// published, and the previously live directory is removed.
    ///
    /// # Errors
    ///
    /// Returns a [`RefreshError`] on the first failure after the config status
    /// was fetched. The stable symlink is only modified by a successful publish
    /// (or by the first-run bootstrap); the partially populated directory of the
    /// failed cycle is left on disk.
    pub async fn refresh_creds(&self) -> Result<RefreshOutcome, RefreshError> {
        let enabled = tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            enabled = is_enabled(&self.fetcher) => enabled,
        };
        if !enabled {
            debug!("Workload certificates are not enabled; skipping refresh");
            return Ok(RefreshOutcome::Disabled);
        }

        let config_status = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            status = fetch_config_status(&self.fetcher) => match status {
                Ok(status) => Some(status),
                Err(e) => {
                    debug!("Workload certificate config status unavailable: {e}");
                    None
                }
            },
        };
        let Some(config_status) = config_status else {
            debug!("Workload certificates are not configured; skipping refresh");
            return Ok(RefreshOutcome::Unconfigured);
        };

        let label = self.clock.now();
        let content_dir = self.paths.content_dir(&label);
        publish::create_content_dir(&content_dir)?;
        info!("Created content directory {}", content_dir.display());

        let result = self
            .populate_and_publish(&label, &content_dir, &config_status)
            .await;
        if let Err(e) = &result {
            warn!(
                "Refresh failed, leaving {} unpublished: {e}",
                content_dir.display()
            );
        }
        result
    }

    async fn populate_and_publish(
        &self,
        label: &str,
        content_dir: &Path,
        config_status: &[u8],
    ) -> Result<RefreshOutcome, RefreshError> {
        publish::write_config_status(content_dir, config_status)?;

        if publish::bootstrap_symlink(&self.paths.symlink, content_dir)? {
            info!(
                "Created {} pointing at {}",
                self.paths.symlink.display(),
                content_dir.display()
            );
        }

        let identities = self.fetch(WORKLOAD_IDENTITIES_KEY).await?;
        let anchors = self.fetch(TRUST_ANCHORS_KEY).await?;

        let spiffe_id = write_workload_identities(content_dir, &identities)?;
        write_trust_anchors(&anchors, content_dir, &spiffe_id)?;

        let temp_symlink = self.paths.temp_symlink(label);
        publish::stage_symlink(&temp_symlink, content_dir)?;

        let previous = publish::snapshot_target(&self.paths.symlink);
        publish::publish(&temp_symlink, &self.paths.symlink)?;
        info!("Published {} for {spiffe_id}", content_dir.display());

        let superseded = publish::remove_superseded(&self.paths.symlink, previous)?;
        if let Some(old) = &superseded {
            info!("Removed superseded content directory {}", old.display());
        }

        Ok(RefreshOutcome::Published(Publication {
            content_dir: content_dir.to_path_buf(),
            spiffe_id,
            superseded,
        }))
    }

    async fn fetch(&self, key: &'static str) -> Result<Bytes, RefreshError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(RefreshError::Cancelled { key }),
            result = self.fetcher.fetch_key(key) => {
                result.map_err(|source| RefreshError::Fetch { key, source })
            }
        }
    }
}
