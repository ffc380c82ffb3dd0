//! Collaborator registry.
//!
//! Maps stage identifiers to the capability that performs them. Stages whose
//! identifier is not registered are rejected when the pipeline is composed.

use releaserc_core::Capability;
use std::collections::HashMap;

/// Identifiers of the standard semantic-release plugins.
pub const STANDARD_COLLABORATORS: [(&str, Capability); 6] = [
    ("@semantic-release/commit-analyzer", Capability::CommitAnalysis),
    ("@semantic-release/release-notes-generator", Capability::ReleaseNotes),
    ("@semantic-release/changelog", Capability::Changelog),
    ("@semantic-release/npm", Capability::PackagePublish),
    ("@semantic-release/github", Capability::RemoteRelease),
    ("@semantic-release/git", Capability::CommitBack),
];

#[derive(Debug, Clone, Default)]
pub struct CollaboratorRegistry {
    entries: HashMap<String, Capability>,
}

impl CollaboratorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the standard plugins registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (name, capability) in STANDARD_COLLABORATORS {
            registry.register(name, capability);
        }
        registry
    }

    /// Register an identifier, returning the capability it replaced.
    pub fn register(&mut self, name: impl Into<String>, capability: Capability) -> Option<Capability> {
        self.entries.insert(name.into(), capability)
    }

    pub fn with(mut self, name: impl Into<String>, capability: Capability) -> Self {
        self.register(name, capability);
        self
    }

    pub fn resolve(&self, name: &str) -> Option<Capability> {
        self.entries.get(name).copied()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = CollaboratorRegistry::standard();
        assert_eq!(registry.identifiers().len(), 6);
        assert_eq!(
            registry.resolve("@semantic-release/git"),
            Some(Capability::CommitBack)
        );
        assert_eq!(
            registry.resolve("@semantic-release/npm"),
            Some(Capability::PackagePublish)
        );
        assert_eq!(registry.resolve("semantic-release/git"), None);
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = CollaboratorRegistry::new();
        assert!(registry.resolve("@acme/notes").is_none());

        assert_eq!(registry.register("@acme/notes", Capability::ReleaseNotes), None);
        assert_eq!(
            registry.register("@acme/notes", Capability::Changelog),
            Some(Capability::ReleaseNotes)
        );
        assert_eq!(registry.resolve("@acme/notes"), Some(Capability::Changelog));
    }
}
