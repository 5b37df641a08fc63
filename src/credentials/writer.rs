use super::payload::{WorkloadIdentities, WorkloadTrustAnchors};
use super::{CredentialError, PayloadKind};
use crate::constants::{
    CA_CERTIFICATES_FILE, CERTIFICATES_FILE, CREDENTIAL_FILE_MODE, PRIVATE_KEY_FILE,
};
use crate::prelude::{info, warn};
use crate::spiffe_id::SpiffeId;
use std::fs::{self, OpenOptions, Permissions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

/// Decodes a workload identities payload and writes `certificates.pem` and
/// `private_key.pem` into `dir`.
///
/// One identity per instance is assumed. If the payload lists several, the
/// lexicographically first SPIFFE ID is written and the rest are ignored.
///
/// # Errors
///
/// Returns a [`CredentialError`] if the payload does not decode, lists no
/// credential, is keyed by an invalid SPIFFE ID, or a file cannot be written.
pub fn write_workload_identities(dir: &Path, payload: &[u8]) -> Result<SpiffeId, CredentialError> {
    let identities: WorkloadIdentities =
        serde_json::from_slice(payload).map_err(|source| CredentialError::MalformedPayload {
            kind: PayloadKind::WorkloadIdentities,
            source,
        })?;

    let mut credentials = identities.workload_credentials.iter();
    let (id, credential) = credentials
        .next()
        .ok_or(CredentialError::NoWorkloadCredentials)?;

    let ignored = credentials.len();
    if ignored > 0 {
        warn!("Workload identities payload lists {ignored} extra identities; using {id}");
    }

    let spiffe_id = SpiffeId::new(id).map_err(|source| CredentialError::SpiffeId {
        id: id.clone(),
        source,
    })?;

    write_file(
        dir.join(CERTIFICATES_FILE),
        credential.certificate_pem.as_bytes(),
    )?;
    write_file(
        dir.join(PRIVATE_KEY_FILE),
        credential.private_key_pem.as_bytes(),
    )?;

    info!("Wrote workload credentials for {spiffe_id}");
    Ok(spiffe_id)
}

/// Decodes a trust anchors payload and writes the anchors of `spiffe_id`'s
/// trust domain to `ca_certificates.pem` in `dir`.
///
/// # Errors
///
/// Returns a [`CredentialError`] if the payload does not decode, no anchors
/// exist for the trust domain, or the file cannot be written.
pub fn write_trust_anchors(
    payload: &[u8],
    dir: &Path,
    spiffe_id: &SpiffeId,
) -> Result<(), CredentialError> {
    let anchors: WorkloadTrustAnchors =
        serde_json::from_slice(payload).map_err(|source| CredentialError::MalformedPayload {
            kind: PayloadKind::TrustAnchors,
            source,
        })?;

    let (domain, anchor) = anchors.trust_anchors.resolve(spiffe_id)?;

    write_file(dir.join(CA_CERTIFICATES_FILE), anchor.anchor_pem.as_bytes())?;

    info!("Wrote trust anchors for trust domain {domain}");
    Ok(())
}

/// Creates or truncates `path`, writes `contents`, and forces the credential file mode.
pub(crate) fn write_credential_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CREDENTIAL_FILE_MODE)
        .open(path)?;
    file.write_all(contents)?;

    // The creation mode is filtered by the umask and ignored for existing files.
    fs::set_permissions(path, Permissions::from_mode(CREDENTIAL_FILE_MODE))
}

fn write_file(path: PathBuf, contents: &[u8]) -> Result<(), CredentialError> {
    write_credential_file(&path, contents).map_err(|source| CredentialError::Write { path, source })
}
