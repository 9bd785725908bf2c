//! Mock server helpers for manifest and artifact endpoints

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::constants::*;

/// Serve `manifest` at `<prefix>/packing_slip.json`, expecting `times` requests
pub async fn mock_manifest(server: &MockServer, prefix: &str, manifest: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", prefix, MANIFEST_NAME)))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest))
        .expect(times)
        .named("manifest")
        .mount(server)
        .await;
}

/// Serve `content` at `<prefix>/<artifact_path>`, expecting `times` requests
pub async fn mock_artifact(
    server: &MockServer,
    prefix: &str,
    artifact_path: &str,
    content: &[u8],
    times: u64,
) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}", prefix, artifact_path)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .expect(times)
        .named("artifact")
        .mount(server)
        .await;
}

/// Fail the first `fail_count` requests with `status`, then serve `content`
pub async fn mock_flaky(
    server: &MockServer,
    route: &str,
    status: u16,
    fail_count: u64,
    content: &[u8],
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(fail_count)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Always answer `route` with `status`, expecting exactly `times` requests
pub async fn mock_status(server: &MockServer, route: &str, status: u16, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(times)
        .mount(server)
        .await;
}
