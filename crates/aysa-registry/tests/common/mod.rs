//! Common test infrastructure for aysa-registry tests
//!
//! Wiremock helpers that stand up a fake Docker Registry v2 API.

#![allow(dead_code)]

use aysa_core::types::{RegistryConfig, ReleaseConfig};
use aysa_registry::{MediaType, RegistryOperations};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const NAMESPACE: &str = "ns";
pub const DIGEST_DEV: &str =
    "sha256:6c3c624b58dbbcd3c0dd82b4c53f04194d1247c6eebdaab7c610cf7d66709b3b";

/// Slim manifest body, served byte-for-byte
pub const SLIM_MANIFEST: &str = r#"{
   "schemaVersion": 2,
   "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
   "config": {"mediaType": "application/vnd.docker.container.image.v1+json", "size": 1510, "digest": "sha256:aaa"},
   "layers": [{"mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip", "size": 2801778, "digest": "sha256:bbb"}]
}"#;

/// Registry settings pointing at the mock server over plain HTTP
pub fn settings(server: &MockServer) -> RegistryConfig {
    let mut settings = RegistryConfig::for_host(server.address().to_string());
    settings.insecure = true;
    settings.namespace = NAMESPACE.to_string();
    settings
}

pub fn operations(server: &MockServer) -> RegistryOperations {
    RegistryOperations::new(&settings(server), ReleaseConfig::default())
        .expect("operations should build")
}

/// `GET /v2/_catalog`
pub async fn mock_catalog(server: &MockServer, repositories: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/v2/_catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "repositories": repositories
        })))
        .mount(server)
        .await;
}

/// `GET /v2/{name}/tags/list`
pub async fn mock_tags(server: &MockServer, name: &str, tags: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/tags/list", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "tags": tags
        })))
        .mount(server)
        .await;
}

/// Slim `GET /v2/{name}/manifests/{reference}` expected exactly `times` times
pub async fn mock_slim_manifest(server: &MockServer, name: &str, reference: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/{}/manifests/{}", name, reference)))
        .and(header("accept", MediaType::V2.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(SLIM_MANIFEST.as_bytes(), MediaType::V2.as_str())
                .insert_header("Docker-Content-Digest", DIGEST_DEV),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Registry error document for any request on the manifest path
pub async fn mock_manifest_unknown(server: &MockServer, name: &str, reference: &str) {
    Mock::given(path(format!("/v2/{}/manifests/{}", name, reference)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"code": "MANIFEST_UNKNOWN", "message": "manifest unknown", "detail": {}}]
        })))
        .mount(server)
        .await;
}

/// Fail the test if any DELETE reaches the registry
pub async fn forbid_deletes(server: &MockServer) {
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(server)
        .await;
}
