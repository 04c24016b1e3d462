//! Runtime configuration types

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Largest page size the tag-listing endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 200;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Upstream registry and repository settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Files that pin the base image
    #[serde(default)]
    pub files: FilesConfig,

    /// CI environment integration
    #[serde(default)]
    pub ci: CiConfig,

    /// Update decision policy
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Upstream registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// Base URL of the registry API
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Upstream repository whose tags are tracked
    #[serde(default = "default_repository")]
    pub repository: String,

    /// Number of tags requested in the single listing call
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            repository: default_repository(),
            page_size: default_page_size(),
            http_timeout_secs: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_registry_url() -> String {
    "https://hub.docker.com".to_string()
}
fn default_repository() -> String {
    "mambaorg/micromamba".to_string()
}
fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}
fn default_http_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!(
        "tagbump/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Paths of the files that pin the base image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FilesConfig {
    /// Build file containing the `ARG BASE_IMAGE=` line
    #[serde(default = "default_dockerfile")]
    pub dockerfile: Option<Utf8PathBuf>,

    /// JSON mapping of logical names to image references
    #[serde(default = "default_base_images")]
    pub base_images: Option<Utf8PathBuf>,

    /// Workflow file holding a YAML list of image references
    #[serde(default)]
    pub workflow: Option<Utf8PathBuf>,

    /// Key introducing the list inside the workflow file
    #[serde(default = "default_workflow_key")]
    pub workflow_key: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            dockerfile: default_dockerfile(),
            base_images: default_base_images(),
            workflow: None,
            workflow_key: default_workflow_key(),
        }
    }
}

fn default_dockerfile() -> Option<Utf8PathBuf> {
    Some(Utf8PathBuf::from("docker/Dockerfile"))
}
fn default_base_images() -> Option<Utf8PathBuf> {
    Some(Utf8PathBuf::from("base-images.json"))
}
fn default_workflow_key() -> String {
    "base-image".to_string()
}

/// CI environment integration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CiConfig {
    /// Environment variable naming the file that receives `KEY=value` lines
    #[serde(default = "default_ci_env_var")]
    pub env_var: String,

    /// Key written for the new build-file tag
    #[serde(default = "default_ci_output_key")]
    pub output_key: String,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            env_var: default_ci_env_var(),
            output_key: default_ci_output_key(),
        }
    }
}

fn default_ci_env_var() -> String {
    "GITHUB_ENV".to_string()
}
fn default_ci_output_key() -> String {
    "NEW_DOCKER_TAG".to_string()
}

/// Update decision policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyConfig {
    /// How to treat a registry digest that changed under an unchanged tag
    #[serde(default)]
    pub digest: DigestPolicy,

    /// Fail when no registry tag shares the pinned distro label
    #[serde(default)]
    pub require_match: bool,
}

/// Handling of a digest change under an unchanged tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DigestPolicy {
    /// Refuse to rewrite and report a digest integrity mismatch
    #[default]
    Strict,
    /// Accept the registry digest as authoritative
    Lenient,
}

impl FromStr for DigestPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(Error::invalid_config(format!(
                "unknown digest policy '{}' (expected strict or lenient)",
                other
            ))),
        }
    }
}

impl fmt::Display for DigestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}
