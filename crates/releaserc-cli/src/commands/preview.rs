//! Pipeline preview: walks the composed stages with collaborators that only
//! report what they would do.

use anyhow::{Context, Result};
use async_trait::async_trait;
use releaserc_config::{CommitBackOptions, TemplateContext};
use releaserc_core::{
    Capability, Collaborator, NextRelease, ReleaseState, ReleaseType, ResolvedStage, StageOutcome,
};
use releaserc_runner::{PipelineEvent, PipelineRunner, StageState};
use std::path::Path;
use std::sync::Arc;

use super::{current_branch, load_config};

/// Stands in for a real collaborator and describes its work on stdout.
struct PreviewCollaborator {
    version: String,
    notes: String,
    channel: Option<String>,
    prerelease: bool,
}

impl PreviewCollaborator {
    fn describe(&self, stage: &ResolvedStage, state: &mut ReleaseState) -> Result<String> {
        let line = match stage.capability {
            Capability::CommitAnalysis => {
                let mut next = NextRelease::new(&self.version);
                next.channel = self.channel.clone();
                state.next_release = Some(next);
                if self.prerelease {
                    state.release_type = Some(ReleaseType::Prerelease);
                }
                format!("next release is {}", self.version)
            }
            Capability::ReleaseNotes => {
                if let Some(next) = state.next_release.as_mut() {
                    next.notes = self.notes.clone();
                }
                format!("generate notes ({} bytes)", self.notes.len())
            }
            Capability::Changelog => {
                let file = stage
                    .options
                    .get("changelogFile")
                    .and_then(|v| v.as_str())
                    .unwrap_or("CHANGELOG.md");
                format!("append notes to {}", file)
            }
            Capability::PackagePublish => {
                let publish = stage
                    .options
                    .get("npmPublish")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true);
                if publish {
                    format!("publish package version {}", self.version)
                } else {
                    format!("update package version to {} without publishing", self.version)
                }
            }
            Capability::RemoteRelease => {
                let tag = state
                    .next_release
                    .as_ref()
                    .map(|n| n.git_tag.clone())
                    .unwrap_or_default();
                format!("create remote release {}", tag)
            }
            Capability::CommitBack => {
                let options = CommitBackOptions::from_options(&stage.options)?;
                let message = options.render_message(&TemplateContext::from_state(state));
                format!(
                    "commit [{}] with message:\n{}",
                    options.assets.join(", "),
                    indent(&message)
                )
            }
        };
        Ok(line)
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("      | {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Collaborator for PreviewCollaborator {
    fn name(&self) -> &str {
        "preview"
    }

    async fn invoke(
        &self,
        stage: &ResolvedStage,
        state: &mut ReleaseState,
    ) -> releaserc_core::Result<StageOutcome> {
        let line = self
            .describe(stage, state)
            .map_err(|e| releaserc_core::Error::stage_failed(&stage.name, e))?;
        println!("    would {}", line);
        Ok(StageOutcome::Continue)
    }
}

/// Walk the pipeline for `version` on `branch` without side effects.
pub async fn run_preview(
    config_path: Option<&Path>,
    version: &str,
    notes: &str,
    branch: Option<String>,
) -> Result<()> {
    let loaded = load_config(config_path)?;
    let branch = branch
        .or_else(current_branch)
        .context("Could not determine the current branch; pass --branch")?;

    let branch_config = loaded.config.branch(&branch).with_context(|| {
        format!(
            "Branch '{}' is not configured for releases (configured: {})",
            branch,
            loaded.config.branch_names().join(", ")
        )
    })?;

    println!("Previewing release {} from '{}'", version, branch);
    println!("Stages: {}", loaded.stages.len());

    let collaborator: Arc<dyn Collaborator> = Arc::new(PreviewCollaborator {
        version: version.to_string(),
        notes: notes.to_string(),
        channel: branch_config.channel.clone(),
        prerelease: branch_config.is_prerelease(),
    });
    let runner = Capability::ALL
        .into_iter()
        .fold(PipelineRunner::new(), |runner, capability| {
            runner.with(capability, collaborator.clone())
        });

    let (mut rx, handle) = runner.execute(&loaded.stages, ReleaseState::for_branch(&branch))?;

    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::StageStarted { index, stage } => {
                println!("▶ [{}] {}", index, stage);
            }
            PipelineEvent::StageCompleted { stage, success, .. } => {
                if !success {
                    println!("✗ Stage '{}' failed", stage);
                }
            }
            PipelineEvent::StageSkipped { stage, reason, .. } => {
                println!("⊘ [{}] skipped: {}", stage, reason);
            }
            PipelineEvent::PipelineCompleted { success } => {
                if success {
                    println!("--- Preview completed ---");
                } else {
                    println!("--- Preview failed ---");
                }
            }
        }
    }

    let result = handle.await.context("Pipeline execution task failed")?;

    if let Some((stage, message)) = result.stages.iter().find_map(|s| match &s.state {
        StageState::Failed { message } => Some((&s.name, message)),
        _ => None,
    }) {
        anyhow::bail!("Stage '{}' failed: {}", stage, message);
    }
    Ok(())
}
