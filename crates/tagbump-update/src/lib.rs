//! Base image update pipeline for tagbump
//!
//! Provides:
//! - Locators for the `ARG BASE_IMAGE=` build-file line, the base-images JSON
//!   mapping, and the workflow matrix list
//! - Candidate selection and the update decision policy
//! - Whole-file writers that touch only the located lines
//! - CI environment output (`NEW_DOCKER_TAG=...`)
//! - [`BaseImageUpdater`], which runs all of the above for one project

pub mod ci;
pub mod engine;
pub mod lines;
pub mod locator;
pub mod updater;
pub mod writer;

pub use ci::CiOutput;
pub use engine::{
    decide, find_candidate, resolve, select_candidate, ResolveOptions, UpdateDecision,
};
pub use lines::LineBuffer;
pub use locator::{BaseImagesManifest, DockerfileLocation, WorkflowItem, WorkflowLocation};
pub use updater::{
    BaseImageUpdater, EntryReport, PinnedReference, TargetKind, TargetReport, UpdateReport,
};

/// Prefix of the build-file line that pins the base image
pub const BASE_IMAGE_ARG: &str = "ARG BASE_IMAGE=";
