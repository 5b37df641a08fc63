//! Refresh cycles driven through the HTTP metadata client against a mock
//! metadata server.

#![cfg(feature = "metadata-client")]

mod common;

use common::{
    anchor_pem, anchors, certificate_pem, config_status, identities, live_target, private_key_pem,
    SPIFFE_ID, TRUST_DOMAIN,
};
use gce_workload_cert_refresh::constants::{
    CA_CERTIFICATES_FILE, CERTIFICATES_FILE, CONFIG_STATUS_FILE, CONFIG_STATUS_KEY,
    PRIVATE_KEY_FILE, TRUST_ANCHORS_KEY, WORKLOAD_IDENTITIES_KEY,
};
use gce_workload_cert_refresh::{
    CredentialRefresher, MetadataClient, OutputPaths, RefreshError, RefreshOutcome, RetryConfig,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROOT: &str = "/computeMetadata/v1";

async fn serve(server: &MockServer, key: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("{ROOT}/{key}")))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

async fn enabled_server() -> MockServer {
    let server = MockServer::start().await;
    serve(
        &server,
        "instance/attributes/enable-workload-certificate",
        200,
        "true".to_string(),
    )
    .await;
    server
}

fn client_for(server: &MockServer) -> MetadataClient {
    MetadataClient::builder()
        .host(server.address().to_string())
        .retry(RetryConfig {
            max_attempts: 2,
            min_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_cycle_over_http_publishes_credentials() {
    let server = enabled_server().await;
    serve(&server, CONFIG_STATUS_KEY, 200, config_status(1)).await;
    serve(&server, WORKLOAD_IDENTITIES_KEY, 200, identities(SPIFFE_ID, 1)).await;
    serve(&server, TRUST_ANCHORS_KEY, 200, anchors(&[TRUST_DOMAIN], 1)).await;

    let root = TempDir::new().unwrap();
    let refresher = CredentialRefresher::builder(client_for(&server))
        .output_paths(OutputPaths::under(root.path()))
        .build();

    let outcome = refresher.refresh_creds().await.unwrap();

    let RefreshOutcome::Published(publication) = outcome else {
        panic!("expected a publication, got {outcome:?}");
    };
    assert_eq!(publication.spiffe_id.to_string(), SPIFFE_ID);

    let live = &refresher.output_paths().symlink;
    assert_eq!(live_target(refresher.output_paths()), publication.content_dir);
    let read = |file: &str| fs::read_to_string(live.join(file)).unwrap();
    assert_eq!(read(CONFIG_STATUS_FILE), config_status(1));
    assert_eq!(read(CERTIFICATES_FILE), certificate_pem(1));
    assert_eq!(read(PRIVATE_KEY_FILE), private_key_pem(1));
    assert_eq!(read(CA_CERTIFICATES_FILE), anchor_pem(TRUST_DOMAIN, 1));
}

#[tokio::test]
async fn test_missing_attribute_over_http_is_disabled() {
    let server = MockServer::start().await;

    let root = TempDir::new().unwrap();
    let refresher = CredentialRefresher::builder(client_for(&server))
        .output_paths(OutputPaths::under(root.path()))
        .build();

    let outcome = refresher.refresh_creds().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Disabled);
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_config_status_over_http_is_unconfigured() {
    let server = enabled_server().await;

    let root = TempDir::new().unwrap();
    let refresher = CredentialRefresher::builder(client_for(&server))
        .output_paths(OutputPaths::under(root.path()))
        .build();

    let outcome = refresher.refresh_creds().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Unconfigured);
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_server_error_on_trust_anchors_fails_cycle() {
    let server = enabled_server().await;
    serve(&server, CONFIG_STATUS_KEY, 200, config_status(1)).await;
    serve(&server, WORKLOAD_IDENTITIES_KEY, 200, identities(SPIFFE_ID, 1)).await;
    serve(&server, TRUST_ANCHORS_KEY, 500, String::new()).await;

    let root = TempDir::new().unwrap();
    let refresher = CredentialRefresher::builder(client_for(&server))
        .output_paths(OutputPaths::under(root.path()))
        .build();

    let err = refresher.refresh_creds().await.unwrap_err();

    assert!(matches!(err, RefreshError::Fetch { key, .. } if key == TRUST_ANCHORS_KEY));
    assert!(err.to_string().contains(TRUST_ANCHORS_KEY));
}
