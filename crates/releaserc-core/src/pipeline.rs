//! Pipeline stage definitions.

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Options attached to a configured stage.
pub type StageOptions = Map<String, Value>;

/// One entry of the plugin list, as written in the configuration document.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// A bare identifier, invoked with default options.
    Bare(String),
    /// An `[identifier, options]` pair.
    Configured { name: String, options: StageOptions },
}

impl Stage {
    pub fn bare(name: impl Into<String>) -> Self {
        Stage::Bare(name.into())
    }

    pub fn configured(name: impl Into<String>, options: StageOptions) -> Self {
        Stage::Configured {
            name: name.into(),
            options,
        }
    }

    /// The collaborator identifier.
    pub fn name(&self) -> &str {
        match self {
            Stage::Bare(name) => name,
            Stage::Configured { name, .. } => name,
        }
    }

    /// Explicit options, if the stage was written as a pair.
    pub fn options(&self) -> Option<&StageOptions> {
        match self {
            Stage::Bare(_) => None,
            Stage::Configured { options, .. } => Some(options),
        }
    }
}

// Serializes back to the document shape: `"name"` or `["name", {..}]`.
impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stage::Bare(name) => serializer.serialize_str(name),
            Stage::Configured { name, options } => {
                let mut pair = serializer.serialize_tuple(2)?;
                pair.serialize_element(name)?;
                pair.serialize_element(options)?;
                pair.end()
            }
        }
    }
}

/// What kind of work a collaborator performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Maps commit history to a release-type decision.
    CommitAnalysis,
    /// Maps commits to release-notes text.
    ReleaseNotes,
    /// Appends notes to a persisted changelog file.
    Changelog,
    /// Publishes the package to a registry.
    PackagePublish,
    /// Creates a release on the remote forge.
    RemoteRelease,
    /// Stages and commits release files back to the repository.
    CommitBack,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::CommitAnalysis,
        Capability::ReleaseNotes,
        Capability::Changelog,
        Capability::PackagePublish,
        Capability::RemoteRelease,
        Capability::CommitBack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CommitAnalysis => "commit_analysis",
            Capability::ReleaseNotes => "release_notes",
            Capability::Changelog => "changelog",
            Capability::PackagePublish => "package_publish",
            Capability::RemoteRelease => "remote_release",
            Capability::CommitBack => "commit_back",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage whose identifier has been bound to a capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStage {
    /// Position in the plugin list.
    pub index: usize,
    /// Collaborator identifier as written in the document.
    pub name: String,
    pub capability: Capability,
    /// Empty for bare stages.
    pub options: StageOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_serializes_to_document_shape() {
        let mut options = StageOptions::new();
        options.insert("assets".to_string(), json!(["CHANGELOG.md"]));

        let stages = vec![
            Stage::bare("@semantic-release/npm"),
            Stage::configured("@semantic-release/git", options),
        ];

        assert_eq!(
            serde_json::to_value(&stages).unwrap(),
            json!([
                "@semantic-release/npm",
                ["@semantic-release/git", {"assets": ["CHANGELOG.md"]}]
            ])
        );
    }

    #[test]
    fn test_stage_accessors() {
        let bare = Stage::bare("@semantic-release/github");
        assert_eq!(bare.name(), "@semantic-release/github");
        assert!(bare.options().is_none());

        let configured = Stage::configured("@semantic-release/changelog", StageOptions::new());
        assert_eq!(configured.name(), "@semantic-release/changelog");
        assert!(configured.options().unwrap().is_empty());
    }
}
