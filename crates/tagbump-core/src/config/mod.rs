//! Runtime configuration for tagbump
//!
//! Configuration is resolved by [`ConfigLoader`] with the following precedence
//! (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Config file (`--config` path, or `tagbump.yaml` in the working directory)
//! 3. Environment variables (`TAGBUMP_*` prefix)
//! 4. CLI flags (handled by caller)

mod loader;
mod types;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use types::{
    CiConfig, DigestPolicy, FilesConfig, PolicyConfig, RegistryConfig, RuntimeConfig,
    MAX_PAGE_SIZE,
};
