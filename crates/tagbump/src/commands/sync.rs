//! `tagbump sync`: rewrite pinned base images

use anyhow::{Context, Result};
use tagbump_core::{DigestPolicy, RuntimeConfig};
use tagbump_update::{BaseImageUpdater, UpdateDecision, UpdateReport};
use tracing::debug;

use crate::cli::SyncArgs;
use crate::output;

/// Execute the sync command
pub async fn run(args: SyncArgs, mut config: RuntimeConfig) -> Result<()> {
    apply_overrides(&args, &mut config);
    debug!(
        "Tracking {} via {} (digest policy: {})",
        config.registry.repository, config.registry.url, config.policy.digest
    );

    let updater =
        BaseImageUpdater::from_config(&config).context("Failed to initialize updater")?;

    let spinner = (!args.json).then(|| {
        output::spinner(&format!(
            "Checking {} for new tags...",
            config.registry.repository
        ))
    });
    let result = updater.run(args.dry_run).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = result.context("Base image update failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Overlay command-line flags onto the loaded configuration
fn apply_overrides(args: &SyncArgs, config: &mut RuntimeConfig) {
    args.files.apply(config);
    if let Some(repository) = &args.repository {
        config.registry.repository = repository.clone();
    }
    if args.lenient {
        config.policy.digest = DigestPolicy::Lenient;
    }
    if args.require_match {
        config.policy.require_match = true;
    }
}

fn print_report(report: &UpdateReport) {
    for target in &report.targets {
        output::header(&format!("{} ({})", target.kind, target.path));
        for entry in &target.entries {
            match &entry.decision {
                UpdateDecision::UpToDate { current } => {
                    output::kv(&entry.label, &format!("{} (up to date)", current.docker_tag()));
                }
                UpdateDecision::Update { from, to } => {
                    output::kv(
                        &entry.label,
                        &format!("{} -> {}", from.docker_tag(), to.docker_tag()),
                    );
                    if from.git_tag == to.git_tag {
                        output::kv("digest", &format!("{} -> {}", from.digest, to.digest));
                    }
                }
            }
        }
    }

    println!();
    if !report.has_updates() {
        output::success("No update needed");
        return;
    }

    if report.dry_run {
        output::info("Dry run: no files were written");
        return;
    }

    let written = report.targets.iter().filter(|t| t.written).count();
    match &report.new_docker_tag {
        Some(tag) if report.ci_exported => {
            output::success(&format!("Update successful: {} (exported to CI)", tag))
        }
        Some(tag) => output::success(&format!("Update successful: {}", tag)),
        None => output::success(&format!("Updated {} file(s)", written)),
    }
}
