//! Module defining constants used within the credential refresher.

/// Metadata attribute that opts an instance into workload certificate rotation.
///
/// Only the exact value `"true"` enables a refresh cycle.
pub const ENABLE_ATTRIBUTE: &str = "enable-workload-certificate";

/// Metadata key holding the raw configuration status blob.
///
/// Any failure fetching this key is read as "feature not configured".
pub const CONFIG_STATUS_KEY: &str = "instance/gce-workload-certificates/config-status";

/// Metadata key holding the workload identities payload (certificate and private key).
pub const WORKLOAD_IDENTITIES_KEY: &str = "instance/gce-workload-certificates/workload-identities";

/// Metadata key holding the trust anchors payload, keyed by trust domain.
pub const TRUST_ANCHORS_KEY: &str = "instance/gce-workload-certificates/trust-anchors";

/// File name of the mirrored configuration status inside a content directory.
pub const CONFIG_STATUS_FILE: &str = "config_status";

/// File name of the workload certificate chain inside a content directory.
pub const CERTIFICATES_FILE: &str = "certificates.pem";

/// File name of the workload private key inside a content directory.
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";

/// File name of the trust anchors inside a content directory.
pub const CA_CERTIFICATES_FILE: &str = "ca_certificates.pem";

/// Mode applied to every credential file.
pub const CREDENTIAL_FILE_MODE: u32 = 0o644;

/// Mode applied to content directories.
pub const CONTENT_DIR_MODE: u32 = 0o755;

/// Directory under which the production output paths live.
pub const DEFAULT_OUTPUT_ROOT: &str = "/run/secrets";

/// Base name of timestamped content directories.
pub const CONTENT_DIR_NAME: &str = "workload-spiffe-contents";

/// Base name of timestamped staging symlinks.
pub const TEMP_SYMLINK_NAME: &str = "workload-spiffe-symlink";

/// Name of the stable symlink consumers read.
pub const SYMLINK_NAME: &str = "workload-spiffe-credentials";

/// Name of the environment variable overriding the metadata server host.
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

/// Metadata server host used when [`METADATA_HOST_ENV`] is unset.
pub const DEFAULT_METADATA_HOST: &str = "169.254.169.254";
