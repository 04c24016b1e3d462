//! Candidate selection and update decisions

use tagbump_core::{DigestPolicy, Error, Result};
use tagbump_registry::{ImageTag, RegistryResult, GIT_TAG_PREFIX};
use tracing::{debug, warn};

/// Outcome of comparing a pinned tag against the registry
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum UpdateDecision {
    /// Pinned reference already matches the newest candidate
    UpToDate { current: ImageTag },
    /// Pinned reference should be rewritten
    Update { from: ImageTag, to: ImageTag },
}

impl UpdateDecision {
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update { .. })
    }

    /// Reference that should be pinned after this decision
    pub fn target(&self) -> &ImageTag {
        match self {
            Self::UpToDate { current } => current,
            Self::Update { to, .. } => to,
        }
    }
}

/// Knobs for [`resolve`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub digest_policy: DigestPolicy,
    /// Treat "no candidate for this distro" as an error instead of up to date
    pub require_match: bool,
}

/// First registry entry, in listing order, that is a `git-` tag for the same distro
pub fn find_candidate(current: &ImageTag, results: &[RegistryResult]) -> Option<ImageTag> {
    results
        .iter()
        .find(|result| {
            result.name.starts_with(GIT_TAG_PREFIX)
                && result.name.ends_with(current.distro.as_str())
                && !result.digest.is_empty()
        })
        .map(|result| {
            let git_tag = result.name.splitn(3, '-').nth(1).unwrap_or_default();
            debug!("Candidate for {}: {}", current.distro, result.name);
            ImageTag {
                repository: current.repository.clone(),
                git_tag: git_tag.to_string(),
                distro: current.distro.clone(),
                digest: result.digest.clone(),
            }
        })
}

/// Like [`find_candidate`], but falls back to `current` when nothing matches
pub fn select_candidate(current: &ImageTag, results: &[RegistryResult]) -> ImageTag {
    find_candidate(current, results).unwrap_or_else(|| current.clone())
}

/// Compare `current` with the selected `candidate`
///
/// A digest change under an unchanged tag fails under [`DigestPolicy::Strict`].
pub fn decide(
    current: &ImageTag,
    candidate: ImageTag,
    policy: DigestPolicy,
) -> Result<UpdateDecision> {
    if candidate == *current {
        return Ok(UpdateDecision::UpToDate {
            current: candidate,
        });
    }

    let same_tag = candidate.git_tag == current.git_tag && candidate.distro == current.distro;
    if same_tag && candidate.digest != current.digest {
        match policy {
            DigestPolicy::Strict => {
                return Err(Error::DigestIntegrityMismatch {
                    repository: current.repository.clone(),
                    tag: current.docker_tag(),
                    current: current.digest.clone(),
                    registry: candidate.digest,
                });
            }
            DigestPolicy::Lenient => {
                warn!(
                    "Digest for {} changed upstream ({} -> {}), accepting registry digest",
                    current.docker_tag(),
                    current.digest,
                    candidate.digest
                );
            }
        }
    }

    Ok(UpdateDecision::Update {
        from: current.clone(),
        to: candidate,
    })
}

/// Select the newest candidate for `current` and decide whether to rewrite it
pub fn resolve(
    current: &ImageTag,
    results: &[RegistryResult],
    options: ResolveOptions,
) -> Result<UpdateDecision> {
    match find_candidate(current, results) {
        Some(candidate) => decide(current, candidate, options.digest_policy),
        None if options.require_match => Err(Error::NoMatchingRegistryEntry {
            repository: current.repository.clone(),
            distro: current.distro.clone(),
        }),
        None => {
            debug!("No registry tag ends with '{}'", current.distro);
            Ok(UpdateDecision::UpToDate {
                current: current.clone(),
            })
        }
    }
}
