use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tagbump_core::{Error, Result};

/// Prefix shared by upstream tags derived from a git commit
pub const GIT_TAG_PREFIX: &str = "git-";

/// Pinned base image reference, split into the fields tagbump tracks
///
/// Canonical form is `repository:git-<git_tag>-<distro>@<digest>`, or
/// `repository:<distro>@<digest>` when there is no git tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageTag {
    /// Repository path (e.g., "mambaorg/micromamba")
    pub repository: String,
    /// Short commit tag (e.g., "c160e88"), empty for plain distro tags
    pub git_tag: String,
    /// Distribution label (e.g., "jammy")
    pub distro: String,
    /// Content digest (e.g., "sha256:e3a59f...")
    pub digest: String,
}

impl ImageTag {
    /// Parse a reference like "mambaorg/micromamba:git-c160e88-jammy@sha256:e3a5..."
    pub fn parse(s: &str) -> Result<Self> {
        let (repository, tag_digest) = s
            .split_once(':')
            .ok_or_else(|| Error::malformed_tag(s, "missing ':' delimiter"))?;
        let (tag, digest) = tag_digest
            .rsplit_once('@')
            .ok_or_else(|| Error::malformed_tag(s, "missing '@' delimiter"))?;

        let (git_tag, distro) = if tag.starts_with(GIT_TAG_PREFIX) {
            let mut parts = tag.splitn(3, '-').skip(1);
            let git_tag = parts.next().unwrap_or_default();
            let distro = parts.next().unwrap_or_default();
            (git_tag, distro)
        } else {
            ("", tag)
        };

        Ok(Self {
            repository: repository.to_string(),
            git_tag: git_tag.to_string(),
            distro: distro.to_string(),
            digest: digest.to_string(),
        })
    }

    /// Tag portion without repository or digest (e.g., "git-c160e88-jammy")
    pub fn docker_tag(&self) -> String {
        if self.git_tag.is_empty() {
            self.distro.clone()
        } else {
            format!("{}{}-{}", GIT_TAG_PREFIX, self.git_tag, self.distro)
        }
    }

    /// Canonical string form; inverse of [`ImageTag::parse`]
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.repository, self.docker_tag(), self.digest)
    }
}

impl FromStr for ImageTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One entry of the registry's tag listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryResult {
    /// Tag name (e.g., "git-c160e88-jammy")
    pub name: String,
    /// Manifest digest; Docker Hub omits it for some legacy tags
    #[serde(default)]
    pub digest: String,
}

impl RegistryResult {
    pub fn new(name: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            digest: digest.into(),
        }
    }
}
