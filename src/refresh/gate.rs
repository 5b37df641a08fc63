use crate::constants::{CONFIG_STATUS_KEY, ENABLE_ATTRIBUTE};
use crate::metadata::{MetadataError, MetadataFetcher};
use crate::prelude::debug;
use bytes::Bytes;

/// Returns `true` only if the enablement attribute is exactly `"true"`.
///
/// Absence, any other value, and transport errors all yield `false`: an
/// instance that never opted in must not produce failures.
pub async fn is_enabled<F: MetadataFetcher>(fetcher: &F) -> bool {
    match fetcher.fetch_attribute(ENABLE_ATTRIBUTE).await {
        Ok(value) => value == "true",
        Err(e) => {
            debug!("Workload certificate attribute unavailable: {e}");
            false
        }
    }
}

/// Fetches the raw config-status blob.
///
/// Any error here means "not configured" to the caller.
pub async fn fetch_config_status<F: MetadataFetcher>(fetcher: &F) -> Result<Bytes, MetadataError> {
    fetcher.fetch_key(CONFIG_STATUS_KEY).await
}
