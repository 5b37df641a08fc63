//! Access to the instance metadata service.
//!
//! The refresher only depends on the narrow [`MetadataFetcher`] trait. The
//! production implementation, [`MetadataClient`], talks HTTP to the metadata
//! server and owns all retry/backoff behavior; callers never retry.

#[cfg(feature = "metadata-client")]
mod client;
mod retry;

#[cfg(feature = "metadata-client")]
pub use client::{MetadataClient, MetadataClientBuilder};
pub use retry::RetryConfig;

use bytes::Bytes;
use std::future::Future;
use thiserror::Error;

/// Reads keys and attributes from the instance metadata service.
///
/// Implementations must be cancel-safe: the refresher may drop an in-flight
/// future when its cancellation token fires.
pub trait MetadataFetcher: Send + Sync {
    /// Fetches the raw value stored under `key`, relative to the metadata root
    /// (e.g. `instance/gce-workload-certificates/trust-anchors`).
    fn fetch_key(&self, key: &str) -> impl Future<Output = Result<Bytes, MetadataError>> + Send;

    /// Fetches the instance attribute `name` as text.
    fn fetch_attribute(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<String, MetadataError>> + Send;
}

/// Errors produced while talking to the metadata service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetadataError {
    /// The key does not exist. For the config-status key this means the feature is not configured.
    #[error("metadata key not found: {key}")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// The metadata server answered with an unexpected HTTP status.
    #[error("metadata server returned status {status} for {key}")]
    Status {
        /// The requested key.
        key: String,
        /// The HTTP status code.
        status: u16,
    },

    /// An attribute value is not valid UTF-8.
    #[error("metadata attribute {key} is not valid UTF-8")]
    InvalidUtf8 {
        /// The requested key.
        key: String,
    },

    /// The metadata server could not be reached.
    #[error("metadata transport error: {0}")]
    Transport(String),

    /// Error reported by the HTTP client.
    #[cfg(feature = "metadata-client")]
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl MetadataError {
    /// Returns `true` if a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::InvalidUtf8 { .. } => false,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Transport(_) => true,
            #[cfg(feature = "metadata-client")]
            Self::Http(e) => e.is_timeout() || e.is_connect(),
        }
    }
}
