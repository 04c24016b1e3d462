//! End-to-end tests for the tagbump binary
//!
//! Tests cover:
//! - `--json` output on stdout staying parseable while verbose logs go to stderr
//! - `sync --dry-run` against a mock registry

use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCKERFILE: &str = "\
ARG BASE_IMAGE=mambaorg/micromamba:git-000000-jammy@sha256:0000
FROM ${BASE_IMAGE}
";

const BASE_IMAGES: &str = r#"{
    "jammy": "mambaorg/micromamba:git-000000-jammy@sha256:0000"
}
"#;

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("docker")).unwrap();
    fs::write(dir.path().join("docker").join("Dockerfile"), DOCKERFILE).unwrap();
    fs::write(dir.path().join("base-images.json"), BASE_IMAGES).unwrap();
    dir
}

fn tagbump(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tagbump").unwrap();
    cmd.current_dir(dir)
        .env_remove("GITHUB_ENV")
        .env_remove("RUST_LOG")
        .env_remove("TAGBUMP_REGISTRY_URL")
        .env_remove("TAGBUMP_REPOSITORY")
        .env_remove("TAGBUMP_DIGEST_POLICY")
        .env_remove("TAGBUMP_DOCKERFILE")
        .env_remove("TAGBUMP_BASE_IMAGES")
        .env_remove("TAGBUMP_WORKFLOW");
    cmd
}

fn parse_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}):\n{}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn test_current_json_with_verbose_logging() {
    let dir = project();

    let output = tagbump(dir.path())
        .args(["-vv", "current", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let pinned = parse_stdout(&output);
    let pinned = pinned.as_array().unwrap();
    assert_eq!(pinned.len(), 2);
    assert_eq!(pinned[0]["label"], "BASE_IMAGE");
    assert_eq!(pinned[1]["label"], "jammy");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sync_json_dry_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/repositories/mambaorg/micromamba/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "git-abc123-jammy", "digest": "sha256:1111" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = project();
    let root = dir.path().to_path_buf();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        tagbump(&root)
            .env("TAGBUMP_REGISTRY_URL", uri)
            .args(["-v", "sync", "--json", "--dry-run"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = parse_stdout(&output);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["new_docker_tag"], "git-abc123-jammy");
    assert_eq!(report["targets"].as_array().unwrap().len(), 2);
    assert!(!output.stderr.is_empty());

    // Dry run leaves the project untouched
    assert_eq!(
        fs::read_to_string(dir.path().join("docker").join("Dockerfile")).unwrap(),
        DOCKERFILE
    );
}
