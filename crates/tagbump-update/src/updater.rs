//! End-to-end base image update for one project
//!
//! Order of operations:
//! 1. Build file (`ARG BASE_IMAGE=` line)
//! 2. Base-images JSON mapping
//! 3. Workflow matrix list
//! 4. CI export of the new build-file tag, when it changed
//!
//! Each configured file must exist. The registry is queried once and the
//! listing is shared by every target. All targets are resolved before any
//! file is written.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fmt;
use tagbump_core::{FilesConfig, Result, RuntimeConfig};
use tagbump_registry::{ImageTag, RegistryClient};
use tracing::{debug, info};

use crate::ci::CiOutput;
use crate::engine::{resolve, ResolveOptions, UpdateDecision};
use crate::locator::{BaseImagesManifest, DockerfileLocation, WorkflowLocation};
use crate::writer;

/// Kind of file holding pinned references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    Dockerfile,
    BaseImages,
    Workflow,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dockerfile => write!(f, "build file"),
            Self::BaseImages => write!(f, "base images"),
            Self::Workflow => write!(f, "workflow"),
        }
    }
}

/// Decision for a single pinned reference
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    /// `BASE_IMAGE`, the mapping key, or `line N` for workflow items
    pub label: String,
    pub decision: UpdateDecision,
}

/// Decisions for every reference in one file
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub kind: TargetKind,
    pub path: Utf8PathBuf,
    pub entries: Vec<EntryReport>,
    /// Whether the file was rewritten
    pub written: bool,
}

impl TargetReport {
    pub fn has_updates(&self) -> bool {
        self.entries.iter().any(|e| e.decision.is_update())
    }
}

/// Result of [`BaseImageUpdater::run`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReport {
    pub targets: Vec<TargetReport>,
    /// New build-file tag (e.g., "git-c160e88-jammy"), when it changed
    pub new_docker_tag: Option<String>,
    /// Whether `new_docker_tag` was appended to the CI environment file
    pub ci_exported: bool,
    pub dry_run: bool,
}

impl UpdateReport {
    pub fn has_updates(&self) -> bool {
        self.targets.iter().any(TargetReport::has_updates)
    }
}

/// A reference as currently pinned on disk
#[derive(Debug, Clone, Serialize)]
pub struct PinnedReference {
    pub kind: TargetKind,
    pub path: Utf8PathBuf,
    pub label: String,
    pub tag: ImageTag,
}

/// Keeps the configured files pinned to the newest upstream tag
pub struct BaseImageUpdater {
    client: RegistryClient,
    files: FilesConfig,
    options: ResolveOptions,
    ci: CiOutput,
}

impl BaseImageUpdater {
    pub fn new(
        client: RegistryClient,
        files: FilesConfig,
        options: ResolveOptions,
        ci: CiOutput,
    ) -> Self {
        Self {
            client,
            files,
            options,
            ci,
        }
    }

    /// Build an updater from runtime configuration, reading the CI output
    /// location from the environment
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let client = RegistryClient::from_config(&config.registry)?;
        let options = ResolveOptions {
            digest_policy: config.policy.digest,
            require_match: config.policy.require_match,
        };
        Ok(Self::new(
            client,
            config.files.clone(),
            options,
            CiOutput::from_env(&config.ci),
        ))
    }

    /// Update every configured file. With `dry_run`, nothing is written.
    ///
    /// Every target is resolved before the first write, so a failed decision
    /// leaves all files and the CI environment untouched.
    pub async fn run(&self, dry_run: bool) -> Result<UpdateReport> {
        let mut report = UpdateReport {
            dry_run,
            ..UpdateReport::default()
        };
        let mut pending = Vec::new();

        if let Some(path) = &self.files.dockerfile {
            let (target, write) = self.plan_dockerfile(path).await?;
            if let Some(PendingWrite::Dockerfile(_, tag)) = &write {
                report.new_docker_tag = Some(tag.docker_tag());
            }
            stage(&mut report, &mut pending, target, write);
        }

        if let Some(path) = &self.files.base_images {
            let (target, write) = self.plan_base_images(path).await?;
            stage(&mut report, &mut pending, target, write);
        }

        if let Some(path) = &self.files.workflow {
            let (target, write) = self.plan_workflow(path).await?;
            stage(&mut report, &mut pending, target, write);
        }

        if dry_run {
            debug!("Dry run, skipping {} pending write(s)", pending.len());
            return Ok(report);
        }

        for (slot, write) in pending {
            report.targets[slot].written = write.apply()?;
        }

        if let Some(docker_tag) = &report.new_docker_tag {
            report.ci_exported = self.ci.emit(docker_tag)?;
        }

        Ok(report)
    }

    async fn plan_dockerfile(
        &self,
        path: &Utf8Path,
    ) -> Result<(TargetReport, Option<PendingWrite>)> {
        info!("Checking {}", path);
        let location = DockerfileLocation::locate(path, self.client.repository())?;
        debug!(
            "Base image tag: {}, distro: {}, digest: {}",
            location.tag.git_tag, location.tag.distro, location.tag.digest
        );

        let results = self.client.fetch_results().await?;
        let decision = resolve(&location.tag, results, self.options)?;

        let write = match &decision {
            UpdateDecision::Update { to, .. } => {
                info!("Build file now pins {}", to.docker_tag());
                Some(PendingWrite::Dockerfile(location, to.clone()))
            }
            UpdateDecision::UpToDate { .. } => {
                info!("No update needed for {}", path);
                None
            }
        };

        let target = TargetReport {
            kind: TargetKind::Dockerfile,
            path: path.to_owned(),
            entries: vec![EntryReport {
                label: "BASE_IMAGE".to_string(),
                decision,
            }],
            written: false,
        };
        Ok((target, write))
    }

    async fn plan_base_images(
        &self,
        path: &Utf8Path,
    ) -> Result<(TargetReport, Option<PendingWrite>)> {
        info!("Checking {}", path);
        let manifest = BaseImagesManifest::load(path)?;
        let results = self.client.fetch_results().await?;

        let mut entries = Vec::with_capacity(manifest.entries.len());
        let mut updated = Vec::with_capacity(manifest.entries.len());
        for (name, tag) in &manifest.entries {
            let decision = resolve(tag, results, self.options)?;
            updated.push((name.clone(), decision.target().clone()));
            entries.push(EntryReport {
                label: name.clone(),
                decision,
            });
        }

        let target = TargetReport {
            kind: TargetKind::BaseImages,
            path: path.to_owned(),
            entries,
            written: false,
        };
        let write = target
            .has_updates()
            .then(|| PendingWrite::BaseImages(path.to_owned(), updated));
        Ok((target, write))
    }

    async fn plan_workflow(
        &self,
        path: &Utf8Path,
    ) -> Result<(TargetReport, Option<PendingWrite>)> {
        info!("Checking {}", path);
        let location = WorkflowLocation::locate(path, &self.files.workflow_key)?;
        let results = self.client.fetch_results().await?;

        let mut entries = Vec::with_capacity(location.items.len());
        let mut targets = Vec::with_capacity(location.items.len());
        for item in &location.items {
            let decision = resolve(&item.tag, results, self.options)?;
            targets.push(decision.target().clone());
            entries.push(EntryReport {
                label: format!("line {}", item.index + 1),
                decision,
            });
        }

        let target = TargetReport {
            kind: TargetKind::Workflow,
            path: path.to_owned(),
            entries,
            written: false,
        };
        let write = target
            .has_updates()
            .then(|| PendingWrite::Workflow(location, targets));
        Ok((target, write))
    }

    /// References currently pinned in the configured files; no registry access
    pub fn pinned(&self) -> Result<Vec<PinnedReference>> {
        let mut pinned = Vec::new();

        if let Some(path) = &self.files.dockerfile {
            let location = DockerfileLocation::locate(path, self.client.repository())?;
            pinned.push(PinnedReference {
                kind: TargetKind::Dockerfile,
                path: path.clone(),
                label: "BASE_IMAGE".to_string(),
                tag: location.tag,
            });
        }

        if let Some(path) = &self.files.base_images {
            let manifest = BaseImagesManifest::load(path)?;
            pinned.extend(
                manifest
                    .entries
                    .into_iter()
                    .map(|(label, tag)| PinnedReference {
                        kind: TargetKind::BaseImages,
                        path: path.clone(),
                        label,
                        tag,
                    }),
            );
        }

        if let Some(path) = &self.files.workflow {
            let location = WorkflowLocation::locate(path, &self.files.workflow_key)?;
            pinned.extend(location.items.into_iter().map(|item| PinnedReference {
                kind: TargetKind::Workflow,
                path: path.clone(),
                label: format!("line {}", item.index + 1),
                tag: item.tag,
            }));
        }

        Ok(pinned)
    }
}

fn stage(
    report: &mut UpdateReport,
    pending: &mut Vec<(usize, PendingWrite)>,
    target: TargetReport,
    write: Option<PendingWrite>,
) {
    if let Some(write) = write {
        pending.push((report.targets.len(), write));
    }
    report.targets.push(target);
}

/// A rewrite decided during planning, applied once every target resolved
enum PendingWrite {
    Dockerfile(DockerfileLocation, ImageTag),
    BaseImages(Utf8PathBuf, Vec<(String, ImageTag)>),
    Workflow(WorkflowLocation, Vec<ImageTag>),
}

impl PendingWrite {
    /// Returns whether the file was written
    fn apply(self) -> Result<bool> {
        match self {
            Self::Dockerfile(mut location, tag) => writer::write_dockerfile(&mut location, &tag),
            Self::BaseImages(path, entries) => writer::write_base_images(&path, &entries),
            Self::Workflow(mut location, tags) => writer::write_workflow(&mut location, &tags),
        }
    }
}
