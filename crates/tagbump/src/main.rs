//! tagbump - keeps base image pins in sync with the upstream registry
//!
//! This is the main entry point for the tagbump command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tagbump_core::ConfigLoader;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = ConfigLoader::new()
        .and_then(|loader| loader.load(cli.config.as_deref()))
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Sync(args) => commands::sync::run(args, config).await,
        Commands::Current(args) => commands::current::run(args, config),
    }
}

/// Initialize tracing with appropriate verbosity
///
/// Logs go to stderr so that `--json` output on stdout stays parseable.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
