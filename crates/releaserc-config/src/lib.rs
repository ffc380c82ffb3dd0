//! Release configuration loading for releaserc.
//!
//! This crate handles:
//! - Parsing configuration documents (JSON, KDL, `package.json` release keys)
//! - Resolving plugin stages against the collaborator registry
//! - Commit-back options and placeholder substitution

pub mod document;
pub mod error;
pub mod kdl_format;
pub mod loader;
pub mod options;
pub mod pipeline;
pub mod registry;
pub mod template;

pub use error::{ConfigError, ConfigResult, ErrorKind};
pub use loader::{ConfigFormat, LoadedConfig, discover, load, load_from_dir, parse_document};
pub use options::{CommitBackOptions, DEFAULT_COMMIT_MESSAGE};
pub use pipeline::{commit_back_options, compose};
pub use registry::CollaboratorRegistry;
pub use template::{TemplateContext, TemplateContextBuilder, directives};
