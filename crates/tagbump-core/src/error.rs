//! Error types for tagbump-core

use thiserror::Error;

/// Result type alias using tagbump-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while locating, resolving, or rewriting base-image references
#[derive(Error, Debug)]
pub enum Error {
    /// A tracked file (build file, base-images mapping, workflow) does not exist
    #[error("File not found: {path}")]
    MissingFile { path: String },

    /// No line in the file carries the expected marker
    #[error("Base image marker '{marker}' not found in {path}")]
    MarkerNotFound { path: String, marker: String },

    /// The marker was found but the reference on that line could not be parsed
    #[error("Malformed base image line {line} in {path}: {reason}")]
    MalformedLine {
        path: String,
        line: usize,
        reason: String,
    },

    /// An image reference string is missing its ':' or '@' delimiter
    #[error("Malformed image reference '{reference}': {reason}")]
    MalformedTag { reference: String, reason: String },

    /// The registry has no tag sharing the current distribution label
    #[error("No registry entry matches distro '{distro}' for {repository}")]
    NoMatchingRegistryEntry { repository: String, distro: String },

    /// The registry reports the same tag under a different digest
    #[error(
        "Digest mismatch for {repository}:{tag}: pinned {current}, registry reports {registry}"
    )]
    DigestIntegrityMismatch {
        repository: String,
        tag: String,
        current: String,
        registry: String,
    },

    /// The registry request failed or returned a non-success status
    #[error("Registry request failed: {message}")]
    Registry { message: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),
}

impl Error {
    /// Create a missing file error
    pub fn missing_file(path: impl Into<String>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    /// Create a marker not found error
    pub fn marker_not_found(path: impl Into<String>, marker: impl Into<String>) -> Self {
        Self::MarkerNotFound {
            path: path.into(),
            marker: marker.into(),
        }
    }

    /// Create a malformed line error. `line` is 1-based.
    pub fn malformed_line(path: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a malformed tag error
    pub fn malformed_tag(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTag {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create a registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_display() {
        let err = Error::malformed_line("docker/Dockerfile", 3, "missing '@' delimiter");
        assert_eq!(
            err.to_string(),
            "Malformed base image line 3 in docker/Dockerfile: missing '@' delimiter"
        );
    }

    #[test]
    fn test_digest_mismatch_display() {
        let err = Error::DigestIntegrityMismatch {
            repository: "mambaorg/micromamba".to_string(),
            tag: "git-abc-jammy".to_string(),
            current: "sha256:aaa".to_string(),
            registry: "sha256:bbb".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git-abc-jammy"));
        assert!(msg.contains("sha256:aaa"));
        assert!(msg.contains("sha256:bbb"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
