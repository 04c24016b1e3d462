//! Shared helpers for tagbump-registry integration tests

#![allow(dead_code)]

use serde_json::json;
use tagbump_registry::RegistryClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPOSITORY: &str = "mambaorg/micromamba";

/// Path of the tag-listing endpoint for [`REPOSITORY`]
pub fn tags_path() -> String {
    format!("/v2/repositories/{}/tags", REPOSITORY)
}

/// Build a Docker Hub style listing body from `(name, digest)` pairs
pub fn listing_body(entries: &[(&str, &str)]) -> serde_json::Value {
    let results: Vec<_> = entries
        .iter()
        .map(|(name, digest)| json!({ "name": name, "digest": digest }))
        .collect();
    json!({ "count": results.len(), "next": null, "results": results })
}

/// Mount a listing endpoint that must be hit exactly `expected_calls` times
pub async fn mock_listing(server: &MockServer, entries: &[(&str, &str)], expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(tags_path()))
        .and(query_param("page_size", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(entries)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount a listing endpoint that always fails with the given status
pub async fn mock_failing_listing(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(tags_path()))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .mount(server)
        .await;
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> RegistryClient {
    RegistryClient::new(server.uri(), REPOSITORY).expect("client should build")
}
