//! # tagbump-core
//!
//! Core library for the tagbump CLI providing:
//! - The error type shared by every tagbump crate
//! - Runtime configuration loading (embedded defaults, config file, environment)

pub mod config;
pub mod error;

pub use config::{
    CiConfig, ConfigLoader, DigestPolicy, FilesConfig, PolicyConfig, RegistryConfig,
    RuntimeConfig,
};
pub use error::{Error, Result};
