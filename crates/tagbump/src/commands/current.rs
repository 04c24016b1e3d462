//! `tagbump current`: show pinned base images without querying the registry

use anyhow::{Context, Result};
use tagbump_core::RuntimeConfig;
use tagbump_update::{BaseImageUpdater, PinnedReference};

use crate::cli::CurrentArgs;
use crate::output;

/// Execute the current command
pub fn run(args: CurrentArgs, mut config: RuntimeConfig) -> Result<()> {
    args.files.apply(&mut config);

    let updater =
        BaseImageUpdater::from_config(&config).context("Failed to initialize updater")?;
    let pinned = updater
        .pinned()
        .context("Failed to read pinned base images")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pinned)?);
        return Ok(());
    }

    if pinned.is_empty() {
        output::warning("No tracked files configured");
        return Ok(());
    }

    let mut last_path = None;
    for reference in &pinned {
        if last_path != Some(&reference.path) {
            output::header(&format!("{} ({})", reference.kind, reference.path));
            last_path = Some(&reference.path);
        }
        print_reference(reference);
    }

    Ok(())
}

fn print_reference(reference: &PinnedReference) {
    let tag = &reference.tag;
    output::kv(&reference.label, &tag.repository);
    if !tag.git_tag.is_empty() {
        output::kv("  git tag", &tag.git_tag);
    }
    output::kv("  distro", &tag.distro);
    output::kv("  digest", &tag.digest);
}
