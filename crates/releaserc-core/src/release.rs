//! Release configuration and per-run release state.

use serde::Serialize;
use std::fmt;

use crate::pipeline::Stage;

/// The parsed configuration document.
///
/// Loaded once at startup and shared read-only afterwards. `plugins` order is
/// execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// Branches a release may be triggered from, in document order.
    pub branches: Vec<Branch>,
    /// Pipeline stages, in document order.
    pub plugins: Vec<Stage>,
}

impl ReleaseConfig {
    /// Whether a release may run from the given checked-out branch.
    pub fn is_eligible(&self, branch: &str) -> bool {
        self.branch(branch).is_some()
    }

    /// The branch entry matching `name`, if any.
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.name == name)
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }
}

/// A release-eligible branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub name: String,
    /// Distribution channel releases from this branch go to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<Prerelease>,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channel: None,
            prerelease: None,
        }
    }

    pub fn is_prerelease(&self) -> bool {
        match &self.prerelease {
            Some(Prerelease::Flag(flag)) => *flag,
            Some(Prerelease::Identifier(_)) => true,
            None => false,
        }
    }
}

/// Prerelease marker on a branch: a flag, or an explicit identifier like `beta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Prerelease {
    Flag(bool),
    Identifier(String),
}

/// Kind of release decided by commit analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    Prerelease,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The release about to be made.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextRelease {
    pub version: String,
    pub git_tag: String,
    pub notes: String,
    pub channel: Option<String>,
}

impl NextRelease {
    /// A release with the conventional `v`-prefixed tag.
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            git_tag: format!("v{}", version),
            version,
            notes: String::new(),
            channel: None,
        }
    }
}

/// The most recent release reachable from the branch.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRelease {
    pub version: String,
    pub git_tag: String,
}

/// State threaded through the stages of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseState {
    /// The checked-out branch the run was triggered from.
    pub branch: String,
    pub release_type: Option<ReleaseType>,
    pub last_release: Option<LastRelease>,
    pub next_release: Option<NextRelease>,
}

impl ReleaseState {
    pub fn for_branch(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..Self::default()
        }
    }
}
