use crate::bundle::TrustAnchorSet;
use serde::Deserialize;
use std::collections::BTreeMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Response of the workload identities metadata key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadIdentities {
    /// Issuance status reported by the metadata service; informational only.
    #[serde(default)]
    pub status: Option<String>,

    /// Credentials keyed by SPIFFE ID.
    #[serde(default)]
    pub workload_credentials: BTreeMap<String, WorkloadCredential>,
}

/// Certificate chain and private key for one workload identity.
///
/// Both PEM blobs are wiped from memory when the value is dropped.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadCredential {
    /// PEM-encoded certificate chain, leaf first.
    pub certificate_pem: String,

    /// PEM-encoded private key.
    pub private_key_pem: String,
}

impl std::fmt::Debug for WorkloadCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadCredential")
            .field("certificate_pem", &self.certificate_pem)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Response of the trust anchors metadata key.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadTrustAnchors {
    /// Issuance status reported by the metadata service; informational only.
    #[serde(default)]
    pub status: Option<String>,

    /// Anchors keyed by trust domain name.
    #[serde(default)]
    pub trust_anchors: TrustAnchorSet,
}
