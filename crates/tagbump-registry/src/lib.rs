//! Base image tracking primitives for tagbump
//!
//! This crate provides:
//! - [`ImageTag`], the parsed form of a pinned reference such as
//!   `mambaorg/micromamba:git-c160e88-jammy@sha256:e3a5...`
//! - [`RegistryClient`], a Docker Hub tag-listing client that queries once per run
//!
//! # Example
//!
//! ```no_run
//! use tagbump_registry::{ImageTag, RegistryClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RegistryClient::new("https://hub.docker.com", "mambaorg/micromamba")?;
//!     let results = client.fetch_results().await?;
//!
//!     let pinned = ImageTag::parse("mambaorg/micromamba:git-c160e88-jammy@sha256:e3a5")?;
//!     println!("{} tags listed, pinned distro {}", results.len(), pinned.distro);
//!
//!     Ok(())
//! }
//! ```

pub mod registry;
pub mod types;

pub use registry::RegistryClient;
pub use types::{ImageTag, RegistryResult, GIT_TAG_PREFIX};
