//! CLI command implementations.

pub mod preview;

use anyhow::{Context, Result};
use releaserc_config::{
    CollaboratorRegistry, CommitBackOptions, LoadedConfig, TemplateContext, TemplateContextBuilder,
    commit_back_options, load, load_from_dir,
};
use releaserc_core::{Branch, ResolvedStage};
use serde::Serialize;
use std::path::Path;
use std::process::Command;
use tracing::warn;

/// Load and compose the configuration, from `path` or by discovery in the
/// current directory.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let registry = CollaboratorRegistry::standard();

    match path {
        Some(path) => load(path, &registry)
            .with_context(|| format!("Failed to load release config: {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
            load_from_dir(&cwd, &registry)
                .with_context(|| format!("Failed to load release config from {}", cwd.display()))
        }
    }
}

pub fn validate(path: Option<&Path>) -> Result<()> {
    match load_config(path) {
        Ok(loaded) => {
            println!(
                "Configuration is valid: {} ({} branches, {} stages)",
                loaded.path.display(),
                loaded.config.branches.len(),
                loaded.stages.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    path: &'a Path,
    branches: &'a [Branch],
    stages: &'a [ResolvedStage],
}

pub fn plan(path: Option<&Path>) -> Result<()> {
    let loaded = load_config(path)?;
    println!("{}", plan_json(&loaded)?);
    Ok(())
}

/// Branches and resolved stages as pretty JSON.
fn plan_json(loaded: &LoadedConfig) -> Result<String> {
    let output = PlanOutput {
        path: &loaded.path,
        branches: &loaded.config.branches,
        stages: &loaded.stages,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

pub fn check_branch(path: Option<&Path>, branch: Option<String>) -> Result<()> {
    let loaded = load_config(path)?;
    let branch = branch
        .or_else(current_branch)
        .context("Could not determine the current branch; pass it explicitly")?;

    let eligible = loaded.config.is_eligible(&branch);
    println!("branch={}", branch);
    println!("eligible={}", eligible);

    if !eligible {
        std::process::exit(1);
    }
    Ok(())
}

pub fn render_message(
    path: Option<&Path>,
    version: &str,
    notes: &str,
    template: Option<String>,
) -> Result<()> {
    let mut ctx = TemplateContextBuilder::new()
        .with_next_release(version, notes)
        .with_branch(current_branch().unwrap_or_default())
        .build();
    ctx.populate_env();

    println!("{}", commit_message(path, template, &ctx)?);
    Ok(())
}

/// Render `template`, or the message of the configured commit-back stage.
fn commit_message(
    path: Option<&Path>,
    template: Option<String>,
    ctx: &TemplateContext,
) -> Result<String> {
    let options = match template {
        Some(message) => CommitBackOptions {
            message,
            ..CommitBackOptions::default()
        },
        None => {
            let loaded = load_config(path)?;
            match commit_back_options(&loaded.stages)? {
                Some(options) => options,
                None => {
                    warn!("No commit-back stage configured; using the default message");
                    CommitBackOptions::default()
                }
            }
        }
    };

    Ok(options.render_message(ctx))
}

/// The checked-out branch, from CI variables or git.
pub fn current_branch() -> Option<String> {
    branch_from_vars(|key| std::env::var(key).ok()).or_else(branch_from_git)
}

/// Branch name from CI environment variables.
///
/// Lookup order: `RELEASERC_BRANCH`, `GITHUB_REF_NAME` (unless the ref is a
/// tag), `CI_COMMIT_BRANCH`, `BRANCH_NAME`, `GIT_BRANCH`. Empty values are
/// skipped.
fn branch_from_vars(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    let var = |key: &str| var(key).filter(|v| !v.is_empty());

    var("RELEASERC_BRANCH")
        .or_else(|| {
            var("GITHUB_REF_NAME").filter(|_| var("GITHUB_REF_TYPE").as_deref() != Some("tag"))
        })
        .or_else(|| var("CI_COMMIT_BRANCH"))
        .or_else(|| var("BRANCH_NAME"))
        .or_else(|| {
            // Jenkins reports remote-qualified names
            var("GIT_BRANCH").map(|b| b.strip_prefix("origin/").unwrap_or(&b).to_string())
        })
        .filter(|b| !b.is_empty())
}

fn branch_from_git() -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|b| !b.is_empty() && b != "HEAD")
}
