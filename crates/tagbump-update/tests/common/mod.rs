//! Shared fixtures for tagbump-update integration tests
//!
//! - `Project`: a temp directory holding a build file, base-images.json and workflow
//! - `mock_listing`: wiremock tag-listing endpoint

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::json;
use std::fs;
use tagbump_core::FilesConfig;
use tagbump_registry::RegistryClient;
use tagbump_update::{BaseImageUpdater, CiOutput, ResolveOptions};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPOSITORY: &str = "mambaorg/micromamba";
pub const OLD_DIGEST: &str = "sha256:0000";
pub const NEW_DIGEST: &str = "sha256:1111";
pub const ALPINE_DIGEST: &str = "sha256:2222";

pub const DOCKERFILE: &str = "\
# syntax=docker/dockerfile:1
ARG BASE_IMAGE=mambaorg/micromamba:git-000000-jammy@sha256:0000
FROM ${BASE_IMAGE}

COPY env.yaml /tmp/env.yaml
";

pub const BASE_IMAGES: &str = r#"{
    "jammy": "mambaorg/micromamba:git-000000-jammy@sha256:0000",
    "alpine": "mambaorg/micromamba:git-000000-alpine3.19@sha256:0000"
}
"#;

pub const WORKFLOW: &str = "\
name: build
jobs:
  build:
    strategy:
      matrix:
        base-image:
          - mambaorg/micromamba:git-000000-jammy@sha256:0000
          - 'mambaorg/micromamba:git-000000-alpine3.19@sha256:0000'
        python: ['3.12']
";

/// Registry listing where both distros moved to `abc123`
pub fn newer_listing() -> Vec<(&'static str, &'static str)> {
    vec![
        ("latest", "sha256:ffff"),
        ("git-abc123-alpine3.19", ALPINE_DIGEST),
        ("git-abc123-jammy", NEW_DIGEST),
        ("git-000000-jammy", OLD_DIGEST),
    ]
}

/// Registry listing matching the fixture files exactly
pub fn current_listing() -> Vec<(&'static str, &'static str)> {
    vec![
        ("git-000000-jammy", OLD_DIGEST),
        ("git-000000-alpine3.19", OLD_DIGEST),
    ]
}

/// Temporary project with all three tracked files
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        fs::create_dir_all(project.root().join("docker")).unwrap();
        fs::write(project.dockerfile(), DOCKERFILE).unwrap();
        fs::write(project.base_images(), BASE_IMAGES).unwrap();
        fs::write(project.workflow(), WORKFLOW).unwrap();
        project
    }

    pub fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).unwrap()
    }

    pub fn dockerfile(&self) -> Utf8PathBuf {
        self.root().join("docker").join("Dockerfile")
    }

    pub fn base_images(&self) -> Utf8PathBuf {
        self.root().join("base-images.json")
    }

    pub fn workflow(&self) -> Utf8PathBuf {
        self.root().join("build.yml")
    }

    pub fn ci_env(&self) -> Utf8PathBuf {
        self.root().join("github_env")
    }

    pub fn files(&self) -> FilesConfig {
        FilesConfig {
            dockerfile: Some(self.dockerfile()),
            base_images: Some(self.base_images()),
            workflow: Some(self.workflow()),
            workflow_key: "base-image".to_string(),
        }
    }

    pub fn updater(&self, server: &MockServer, options: ResolveOptions) -> BaseImageUpdater {
        self.updater_with_files(server, options, self.files())
    }

    pub fn updater_with_files(
        &self,
        server: &MockServer,
        options: ResolveOptions,
        files: FilesConfig,
    ) -> BaseImageUpdater {
        let client = RegistryClient::new(server.uri(), REPOSITORY).expect("client");
        let ci = CiOutput::new(Some(self.ci_env().into_std_path_buf()), "NEW_DOCKER_TAG");
        BaseImageUpdater::new(client, files, options, ci)
    }
}

pub fn read(path: &Utf8Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

/// Mount the tag listing; it must be requested exactly once
pub async fn mock_listing(server: &MockServer, entries: &[(&str, &str)]) {
    let results: Vec<_> = entries
        .iter()
        .map(|(name, digest)| json!({ "name": name, "digest": digest }))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/v2/repositories/{}/tags", REPOSITORY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .expect(1)
        .mount(server)
        .await;
}
