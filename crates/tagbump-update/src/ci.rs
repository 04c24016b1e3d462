//! CI environment output
//!
//! GitHub Actions exposes a file path in `$GITHUB_ENV`; every `KEY=value`
//! line appended to it becomes an environment variable for later steps.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tagbump_core::{CiConfig, Result};
use tracing::{debug, info};

/// Appends `KEY=value` lines to the CI environment file, when one is configured
#[derive(Debug, Clone)]
pub struct CiOutput {
    path: Option<PathBuf>,
    key: String,
}

impl CiOutput {
    pub fn new(path: Option<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path,
            key: key.into(),
        }
    }

    /// Resolve the output file from the environment variable named in `config`
    pub fn from_env(config: &CiConfig) -> Self {
        let path = std::env::var_os(&config.env_var)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        if path.is_none() {
            debug!("{} not set, CI output disabled", config.env_var);
        }
        Self::new(path, config.output_key.clone())
    }

    /// Output that never writes
    pub fn disabled() -> Self {
        Self::new(None, String::new())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Append `KEY=value`; returns whether a line was written
    pub fn emit(&self, value: &str) -> Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}={}", self.key, value)?;
        info!("Exported {}={} to {}", self.key, value, path.display());
        Ok(true)
    }
}
