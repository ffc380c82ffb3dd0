//! Pipeline composition: binding each configured stage to a capability.

use crate::options::CommitBackOptions;
use crate::registry::CollaboratorRegistry;
use crate::{ConfigError, ConfigResult};
use releaserc_core::{Capability, ReleaseConfig, ResolvedStage};
use tracing::debug;

/// Resolve every stage of `config`, in order.
///
/// Fails on the first identifier with no registered collaborator; no partial
/// pipeline is ever returned. Commit-back options are validated here so a
/// malformed stage is rejected before anything runs.
pub fn compose(
    config: &ReleaseConfig,
    registry: &CollaboratorRegistry,
) -> ConfigResult<Vec<ResolvedStage>> {
    let mut stages = Vec::with_capacity(config.plugins.len());

    for (index, stage) in config.plugins.iter().enumerate() {
        let capability =
            registry
                .resolve(stage.name())
                .ok_or_else(|| ConfigError::UnknownStage {
                    index,
                    name: stage.name().to_string(),
                })?;

        let options = stage.options().cloned().unwrap_or_default();

        if capability == Capability::CommitBack {
            CommitBackOptions::from_options(&options).map_err(|e| match e {
                ConfigError::InvalidValue { field, message } => ConfigError::InvalidValue {
                    field: format!("plugins[{}].{}", index, field),
                    message,
                },
                other => other,
            })?;
        }

        debug!(index, stage = %stage.name(), %capability, "Resolved stage");

        stages.push(ResolvedStage {
            index,
            name: stage.name().to_string(),
            capability,
            options,
        });
    }

    Ok(stages)
}

/// Options of the first commit-back stage, if the pipeline has one.
pub fn commit_back_options(stages: &[ResolvedStage]) -> ConfigResult<Option<CommitBackOptions>> {
    stages
        .iter()
        .find(|s| s.capability == Capability::CommitBack)
        .map(|s| CommitBackOptions::from_options(&s.options))
        .transpose()
}
