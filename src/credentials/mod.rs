//! Decoding of the metadata credential payloads and the files written from them.
//!
//! Both writers assume the target directory already exists. Every file is
//! truncated and rewritten, then given the fixed world-readable
//! [`CREDENTIAL_FILE_MODE`](crate::constants::CREDENTIAL_FILE_MODE).

mod payload;
mod writer;

pub use payload::{WorkloadCredential, WorkloadIdentities, WorkloadTrustAnchors};
pub use writer::{write_trust_anchors, write_workload_identities};

pub(crate) use writer::write_credential_file;

use crate::bundle::TrustAnchorError;
use crate::spiffe_id::SpiffeIdError;
use std::path::PathBuf;
use thiserror::Error;

/// Which metadata payload failed to decode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PayloadKind {
    /// The workload identities payload.
    WorkloadIdentities,
    /// The trust anchors payload.
    TrustAnchors,
}

impl PayloadKind {
    /// Returns a stable string representation of the payload kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorkloadIdentities => "workload identities",
            Self::TrustAnchors => "trust anchors",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while decoding payloads or writing credential files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CredentialError {
    /// The payload is not the expected JSON document.
    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        /// The payload that failed to decode.
        kind: PayloadKind,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The workload identities payload lists no credential.
    #[error("workload identities payload contains no credentials")]
    NoWorkloadCredentials,

    /// A credential is keyed by something that is not a SPIFFE ID.
    #[error("invalid SPIFFE ID {id:?}: {source}")]
    SpiffeId {
        /// The offending key.
        id: String,
        /// Why it was rejected.
        #[source]
        source: SpiffeIdError,
    },

    /// The identity's trust domain has no anchors.
    #[error(transparent)]
    TrustAnchor(#[from] TrustAnchorError),

    /// A credential file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
