//! Refresh cycles with output paths relative to the working directory.
//!
//! Kept in its own test binary because it changes the process working directory.

mod common;

use common::{certificate_pem, counting_clock, FakeMetadata};
use gce_workload_cert_refresh::constants::CERTIFICATES_FILE;
use gce_workload_cert_refresh::{CredentialRefresher, OutputPaths, RefreshOutcome};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[tokio::test]
async fn test_relative_root_publishes_resolvable_symlink() {
    let cwd = TempDir::new().unwrap();
    std::env::set_current_dir(cwd.path()).unwrap();
    fs::create_dir("out").unwrap();

    let fake = FakeMetadata::serving(1);
    let refresher = CredentialRefresher::builder(fake.clone())
        .output_paths(OutputPaths::under("out"))
        .clock(counting_clock())
        .build();
    let symlink = refresher.output_paths().symlink.clone();

    let outcome = refresher.refresh_creds().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Published(_)));
    assert_eq!(
        fs::read_link(&symlink).unwrap(),
        Path::new("workload-spiffe-contents-1")
    );
    assert_eq!(
        fs::read_to_string(symlink.join(CERTIFICATES_FILE)).unwrap(),
        certificate_pem(1)
    );

    fake.rotate(2);
    let RefreshOutcome::Published(publication) = refresher.refresh_creds().await.unwrap() else {
        panic!("second cycle did not publish");
    };

    assert_eq!(
        publication.superseded,
        Some(Path::new("out").join("workload-spiffe-contents-1"))
    );
    assert!(!Path::new("out/workload-spiffe-contents-1").exists());
    assert_eq!(
        fs::read_to_string(symlink.join(CERTIFICATES_FILE)).unwrap(),
        certificate_pem(2)
    );
}
