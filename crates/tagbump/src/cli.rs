//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use tagbump_core::RuntimeConfig;

/// tagbump - keep base image pins in sync with the upstream registry
#[derive(Parser, Debug)]
#[command(name = "tagbump")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to tagbump.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite pinned base images to the newest upstream tag
    Sync(SyncArgs),

    /// Show the base images currently pinned in the tracked files
    Current(CurrentArgs),
}

/// File locations shared by every command; each overrides the config value
#[derive(Args, Debug, Default)]
pub struct FileArgs {
    /// Build file containing the ARG BASE_IMAGE= line
    #[arg(long)]
    pub dockerfile: Option<Utf8PathBuf>,

    /// JSON mapping of names to base image references
    #[arg(long)]
    pub base_images: Option<Utf8PathBuf>,

    /// Workflow file with a base-image matrix list
    #[arg(long)]
    pub workflow: Option<Utf8PathBuf>,

    /// Matrix key introducing the workflow list
    #[arg(long)]
    pub workflow_key: Option<String>,
}

impl FileArgs {
    /// Overlay the flags onto the loaded configuration
    pub fn apply(&self, config: &mut RuntimeConfig) {
        if let Some(path) = &self.dockerfile {
            config.files.dockerfile = Some(path.clone());
        }
        if let Some(path) = &self.base_images {
            config.files.base_images = Some(path.clone());
        }
        if let Some(path) = &self.workflow {
            config.files.workflow = Some(path.clone());
        }
        if let Some(key) = &self.workflow_key {
            config.files.workflow_key = key.clone();
        }
    }
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub files: FileArgs,

    /// Upstream repository to track (e.g., mambaorg/micromamba)
    #[arg(long)]
    pub repository: Option<String>,

    /// Accept a changed digest under an unchanged tag instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Fail when no upstream tag shares a pinned distro
    #[arg(long)]
    pub require_match: bool,

    /// Show what would change without writing files or CI output
    #[arg(long)]
    pub dry_run: bool,

    /// Output the update report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CurrentArgs {
    #[command(flatten)]
    pub files: FileArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
