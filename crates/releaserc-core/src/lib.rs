//! Core domain types and traits for releaserc.
//!
//! This crate contains:
//! - The parsed release configuration (branches and plugin stages)
//! - Capabilities and resolved stages
//! - The collaborator trait and per-run release state
//! - Run identifiers

pub mod collaborator;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod release;

pub use collaborator::{Collaborator, StageOutcome};
pub use error::{Error, Result};
pub use id::RunId;
pub use pipeline::{Capability, ResolvedStage, Stage, StageOptions};
pub use release::{
    Branch, LastRelease, NextRelease, Prerelease, ReleaseConfig, ReleaseState, ReleaseType,
};
