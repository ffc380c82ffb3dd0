//! Placeholder substitution for commit messages and other templated options.
//!
//! Supports variables like:
//! - `${nextRelease.version}` - Version being released
//! - `${nextRelease.gitTag}` - Tag of the release
//! - `${nextRelease.notes}` - Generated release notes
//! - `${nextRelease.channel}` - Distribution channel
//! - `${nextRelease.type}` - Release type (major, minor, ...)
//! - `${lastRelease.version}` - Previous version
//! - `${lastRelease.gitTag}` - Previous tag
//! - `${branch.name}` - Branch the release runs on
//! - `${env.VAR_NAME}` - Environment variable
//! - `${timestamp}` - Unix timestamp
//! - `${date}` - ISO date (YYYY-MM-DD)
//! - `${datetime}` - ISO datetime
//!
//! Substitution is purely textual. Everything outside a recognised
//! placeholder, including directives such as `[skip ci]`, is copied through
//! unchanged, and unresolved placeholders are left as written.

use regex::Regex;
use releaserc_core::{LastRelease, NextRelease, ReleaseState, ReleaseType};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Markers that tell CI systems not to run on a commit.
pub const CI_DIRECTIVES: [&str; 5] = [
    "[skip ci]",
    "[ci skip]",
    "[no ci]",
    "[skip actions]",
    "[actions skip]",
];

// Regex for matching ${...} variables
static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}").unwrap()
});

/// Values available to templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub next_release: Option<NextRelease>,
    pub last_release: Option<LastRelease>,
    pub release_type: Option<ReleaseType>,
    pub branch: String,
    /// Environment variables
    pub env: HashMap<String, String>,
    /// Custom single-segment variables
    pub custom: HashMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for the current point of a release run.
    pub fn from_state(state: &ReleaseState) -> Self {
        Self {
            next_release: state.next_release.clone(),
            last_release: state.last_release.clone(),
            release_type: state.release_type,
            branch: state.branch.clone(),
            ..Self::default()
        }
    }

    /// Populate environment variables from the current process environment.
    pub fn populate_env(&mut self) {
        for (key, value) in std::env::vars() {
            self.env.insert(key, value);
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.custom.insert(name.to_string(), value.into());
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, var_name: &str) -> Option<String> {
        let parts: Vec<&str> = var_name.split('.').collect();
        let next = self.next_release.as_ref();
        let last = self.last_release.as_ref();

        match parts.as_slice() {
            ["nextRelease", "version"] => next.map(|r| r.version.clone()),
            ["nextRelease", "gitTag"] => next.map(|r| r.git_tag.clone()),
            ["nextRelease", "notes"] => next.map(|r| r.notes.clone()),
            ["nextRelease", "channel"] => next.and_then(|r| r.channel.clone()),
            ["nextRelease", "type"] => self.release_type.map(|t| t.to_string()),

            ["lastRelease", "version"] => last.map(|r| r.version.clone()),
            ["lastRelease", "gitTag"] => last.map(|r| r.git_tag.clone()),

            ["branch", "name"] => Some(self.branch.clone()),

            ["env", name] => self.env.get(*name).cloned(),

            ["timestamp"] => Some(chrono::Utc::now().timestamp().to_string()),
            ["date"] => Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            ["datetime"] => Some(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),

            [name] => self.custom.get(*name).cloned(),

            _ => None,
        }
    }

    /// Substitute every resolvable `${...}` placeholder in `template`.
    /// Substituted values are not scanned again.
    pub fn render(&self, template: &str) -> String {
        VAR_REGEX
            .replace_all(template, |caps: &regex::Captures| {
                let var_name = &caps[1];
                self.resolve(var_name)
                    .unwrap_or_else(|| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Placeholder names used in `template`, in order of appearance.
    pub fn placeholders(template: &str) -> Vec<String> {
        VAR_REGEX
            .captures_iter(template)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

/// CI directives present in `text`.
pub fn directives(text: &str) -> Vec<&'static str> {
    CI_DIRECTIVES
        .iter()
        .copied()
        .filter(|d| text.contains(*d))
        .collect()
}

/// Builder for creating TemplateContext.
pub struct TemplateContextBuilder {
    ctx: TemplateContext,
}

impl TemplateContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: TemplateContext::new(),
        }
    }

    pub fn with_next_release(mut self, version: impl Into<String>, notes: impl Into<String>) -> Self {
        let mut next = NextRelease::new(version);
        next.notes = notes.into();
        self.ctx.next_release = Some(next);
        self
    }

    pub fn with_git_tag(mut self, tag: impl Into<String>) -> Self {
        let next = self.ctx.next_release.get_or_insert_with(NextRelease::default);
        next.git_tag = tag.into();
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        let next = self.ctx.next_release.get_or_insert_with(NextRelease::default);
        next.channel = Some(channel.into());
        self
    }

    pub fn with_release_type(mut self, release_type: ReleaseType) -> Self {
        self.ctx.release_type = Some(release_type);
        self
    }

    pub fn with_last_release(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.ctx.last_release = Some(LastRelease {
            git_tag: format!("v{}", version),
            version,
        });
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.ctx.branch = branch.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.env.insert(key.into(), value.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.ctx.custom.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> TemplateContext {
        self.ctx
    }
}

impl Default for TemplateContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
