//! Runs a single workload credential refresh cycle.
//!
//! Takes no arguments; an external scheduler invokes it periodically. Exits 0
//! when credentials were published or the feature is disabled/unconfigured,
//! and 1 on the first unrecovered failure. Log verbosity follows `RUST_LOG`
//! (default `info`); the metadata server host follows `GCE_METADATA_HOST`.

use anyhow::Context as _;
use gce_workload_cert_refresh::{CredentialRefresher, MetadataClient, RefreshOutcome};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Workload credential refresh failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let client = MetadataClient::new().context("failed to create metadata client")?;
    let refresher = CredentialRefresher::builder(client).build();

    let cancel = refresher.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match refresher.refresh_creds().await? {
        RefreshOutcome::Published(publication) => info!(
            "Published credentials for {} at {}",
            publication.spiffe_id,
            refresher.output_paths().symlink.display()
        ),
        RefreshOutcome::Disabled => info!("Workload certificates disabled; nothing to do"),
        RefreshOutcome::Unconfigured => {
            info!("Workload certificates not configured; nothing to do");
        }
    }
    Ok(())
}
