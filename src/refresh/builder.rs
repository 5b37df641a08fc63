use super::{CredentialRefresher, OutputPaths};
use crate::clock::{Clock, SystemClock};
use crate::metadata::MetadataFetcher;
use tokio_util::sync::CancellationToken;

/// Builder for [`CredentialRefresher`].
///
/// # Example
///
/// ```
/// use gce_workload_cert_refresh::{
///     CredentialRefresher, MetadataError, MetadataFetcher, OutputPaths,
/// };
/// use bytes::Bytes;
///
/// struct Unconfigured;
///
/// impl MetadataFetcher for Unconfigured {
///     async fn fetch_key(&self, key: &str) -> Result<Bytes, MetadataError> {
///         Err(MetadataError::NotFound { key: key.to_string() })
///     }
///
///     async fn fetch_attribute(&self, name: &str) -> Result<String, MetadataError> {
///         Err(MetadataError::NotFound { key: name.to_string() })
///     }
/// }
///
/// let refresher = CredentialRefresher::builder(Unconfigured)
///     .output_paths(OutputPaths::under("/tmp/creds"))
///     .clock(|| "1".to_string())
///     .build();
/// ```
#[derive(Debug)]
pub struct CredentialRefresherBuilder<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    paths: OutputPaths,
    cancel: Option<CancellationToken>,
}

impl<F: MetadataFetcher> CredentialRefresherBuilder<F, SystemClock> {
    pub(super) fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            clock: SystemClock,
            paths: OutputPaths::default(),
            cancel: None,
        }
    }
}

impl<F: MetadataFetcher, C: Clock> CredentialRefresherBuilder<F, C> {
    /// Sets the output locations (default: under `/run/secrets`).
    #[must_use]
    pub fn output_paths(mut self, paths: OutputPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Sets the clock used to label content directories and staging symlinks.
    #[must_use]
    pub fn clock<C2: Clock>(self, clock: C2) -> CredentialRefresherBuilder<F, C2> {
        CredentialRefresherBuilder {
            fetcher: self.fetcher,
            clock,
            paths: self.paths,
            cancel: self.cancel,
        }
    }

    /// Sets the token that aborts in-flight metadata requests.
    ///
    /// Without it, the refresher owns a token reachable through
    /// [`CredentialRefresher::cancellation_token`].
    #[must_use]
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds the refresher.
    pub fn build(self) -> CredentialRefresher<F, C> {
        CredentialRefresher {
            fetcher: self.fetcher,
            clock: self.clock,
            paths: self.paths,
            cancel: self.cancel.unwrap_or_default(),
        }
    }
}
