use super::retry::{next_backoff, RetryConfig};
use super::{MetadataError, MetadataFetcher};
use crate::constants::{DEFAULT_METADATA_HOST, METADATA_HOST_ENV};
use crate::prelude::debug;
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;

const METADATA_ROOT: &str = "computeMetadata/v1";
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const METADATA_FLAVOR: &str = "Google";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the instance metadata server.
///
/// Requests go to `http://<host>/computeMetadata/v1/<key>` with the
/// `Metadata-Flavor: Google` header. A `404` maps to
/// [`MetadataError::NotFound`] and is never retried; transport errors and
/// server errors are retried according to the configured [`RetryConfig`].
///
/// # Example
///
/// ```no_run
/// use gce_workload_cert_refresh::{MetadataClient, MetadataFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MetadataClient::new()?;
/// let enabled = client.fetch_attribute("enable-workload-certificate").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl MetadataClient {
    /// Creates a client with default settings, honoring `GCE_METADATA_HOST`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Http`] if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, MetadataError> {
        Self::builder().build()
    }

    /// Returns a builder for explicit configuration.
    pub fn builder() -> MetadataClientBuilder {
        MetadataClientBuilder::default()
    }

    /// Returns the URL every key is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, key: &str) -> Result<Bytes, MetadataError> {
        let mut backoff = self.retry.min_backoff;
        let mut attempt = 1;

        loop {
            match self.get_once(key).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retry.max_attempts && e.is_retryable() => {
                    debug!(
                        "Metadata request for {key} failed (attempt {attempt}): {e}; retrying in {backoff:?}"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = next_backoff(backoff, self.retry.max_backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, key: &str) -> Result<Bytes, MetadataError> {
        let url = format!("{}{}", self.base_url, key.trim_start_matches('/'));
        let response = self
            .http
            .get(&url)
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.bytes().await?),
            StatusCode::NOT_FOUND => Err(MetadataError::NotFound {
                key: key.to_string(),
            }),
            status => Err(MetadataError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

impl MetadataFetcher for MetadataClient {
    async fn fetch_key(&self, key: &str) -> Result<Bytes, MetadataError> {
        self.get(key).await
    }

    async fn fetch_attribute(&self, name: &str) -> Result<String, MetadataError> {
        let key = format!("instance/attributes/{name}");
        let body = self.get(&key).await?;
        String::from_utf8(body.to_vec()).map_err(|_| MetadataError::InvalidUtf8 { key })
    }
}

/// Builder for [`MetadataClient`].
///
/// ```no_run
/// use gce_workload_cert_refresh::{MetadataClient, RetryConfig};
/// use std::time::Duration;
///
/// let client = MetadataClient::builder()
///     .host("metadata.google.internal")
///     .timeout(Duration::from_secs(2))
///     .retry(RetryConfig::no_retry())
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MetadataClientBuilder {
    host: Option<String>,
    timeout: Option<Duration>,
    retry: RetryConfig,
}

impl MetadataClientBuilder {
    /// Sets the metadata server host (and optional port).
    ///
    /// Without it, `GCE_METADATA_HOST` is consulted, then `169.254.169.254`.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the per-request timeout (default 5s).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Http`] if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<MetadataClient, MetadataError> {
        let host = self
            .host
            .or_else(|| std::env::var(METADATA_HOST_ENV).ok().filter(|h| !h.is_empty()))
            .unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string());

        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .no_proxy()
            .build()?;

        Ok(MetadataClient {
            http,
            base_url: format!("http://{host}/{METADATA_ROOT}/"),
            retry: self.retry.normalize(),
        })
    }
}
