//! Layered configuration loader

use super::types::{RuntimeConfig, MAX_PAGE_SIZE};
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use tracing::{debug, warn};

/// Config file looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "tagbump.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Loads [`RuntimeConfig`] from embedded defaults, a config file, and the environment
pub struct ConfigLoader {
    /// Directory searched for `tagbump.yaml`
    working_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at the current working directory
    pub fn new() -> Result<Self> {
        let cwd = env::current_dir()?;
        let working_dir = Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
            Error::invalid_config(format!("working directory is not UTF-8: {}", p.display()))
        })?;
        Ok(Self { working_dir })
    }

    /// Create a loader with a custom working directory
    pub fn with_dir(working_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Load runtime configuration with layered precedence
    ///
    /// An explicit `path` must exist; the implicit `tagbump.yaml` is optional.
    pub fn load(&self, path: Option<&Utf8Path>) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("defaults.yaml")?;

        let file_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::missing_file(p.as_str()));
                }
                Some(p.to_owned())
            }
            None => {
                let candidate = self.working_dir.join(CONFIG_FILE_NAME);
                candidate.exists().then_some(candidate)
            }
        };

        if let Some(file_path) = file_path {
            debug!("Loading configuration from {}", file_path);
            // Keys missing from the file are filled by the serde defaults,
            // which mirror the embedded defaults
            config = Self::load_yaml_file::<RuntimeConfig>(&file_path)?;
        }

        config = Self::apply_env_overrides(config)?;
        Self::validate(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::invalid_config(format!("embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Apply `TAGBUMP_*` environment variable overrides
    fn apply_env_overrides(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("TAGBUMP_REGISTRY_URL") {
            config.registry.url = val;
        }

        if let Ok(val) = env::var("TAGBUMP_REPOSITORY") {
            config.registry.repository = val;
        }

        if let Ok(val) = env::var("TAGBUMP_PAGE_SIZE") {
            config.registry.page_size = val.parse().map_err(|_| {
                Error::invalid_config("TAGBUMP_PAGE_SIZE must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("TAGBUMP_HTTP_TIMEOUT_SECS") {
            config.registry.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("TAGBUMP_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("TAGBUMP_DOCKERFILE") {
            config.files.dockerfile = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("TAGBUMP_BASE_IMAGES") {
            config.files.base_images = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("TAGBUMP_WORKFLOW") {
            config.files.workflow = Some(Utf8PathBuf::from(val));
        }

        if let Ok(val) = env::var("TAGBUMP_DIGEST_POLICY") {
            config.policy.digest = val.parse()?;
        }

        Ok(config)
    }

    fn validate(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if config.registry.page_size == 0 {
            return Err(Error::invalid_config("registry page-size must be at least 1"));
        }
        if config.registry.page_size > MAX_PAGE_SIZE {
            warn!(
                "registry page-size {} exceeds {}, clamping",
                config.registry.page_size, MAX_PAGE_SIZE
            );
            config.registry.page_size = MAX_PAGE_SIZE;
        }
        if config.registry.repository.trim().is_empty() {
            return Err(Error::invalid_config("registry repository must not be empty"));
        }
        Ok(config)
    }
}
