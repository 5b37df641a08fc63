#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! Rotation of workload identity credentials published by the instance metadata service.
//!
//! Each refresh cycle fetches the workload certificate, private key and trust
//! anchors, writes them into a fresh content directory, and then publishes that
//! directory by atomically renaming a symlink over a single stable path.
//! Consumers doing mutual TLS read `certificates.pem`, `private_key.pem` and
//! `ca_certificates.pem` through that path and never observe a partially
//! written or mixed set of files.
//!
//! ```no_run
//! # #[cfg(feature = "metadata-client")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use gce_workload_cert_refresh::{CredentialRefresher, MetadataClient};
//!
//! let refresher = CredentialRefresher::builder(MetadataClient::new()?).build();
//! let outcome = refresher.refresh_creds().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **`metadata-client`** (default): HTTP [`MetadataClient`] for the metadata server
//! - **`tracing`** (default): log events through `tracing`
//! - **`logging`**: log events through `log` when `tracing` is disabled
//! - **`cli`** (default): the `gce_workload_cert_refresh` binary

mod observability;
mod prelude;

pub mod bundle;
pub mod clock;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod metadata;
pub mod refresh;
pub mod spiffe_id;

// -----------------------
// Re-exports
// -----------------------

pub use crate::{
    bundle::{find_domain, TrustAnchor, TrustAnchorError, TrustAnchorSet},
    clock::{Clock, SystemClock},
    credentials::{write_trust_anchors, write_workload_identities, CredentialError},
    error::{FsStep, RefreshError},
    metadata::{MetadataError, MetadataFetcher, RetryConfig},
    refresh::{
        is_enabled, CredentialRefresher, CredentialRefresherBuilder, OutputPaths, Publication,
        RefreshOutcome,
    },
    spiffe_id::{SpiffeId, SpiffeIdError, TrustDomain},
};

#[cfg(feature = "metadata-client")]
pub use crate::metadata::{MetadataClient, MetadataClientBuilder};
