//! Pipeline orchestrator - executes release stages strictly in configured order.

use releaserc_core::{Capability, Collaborator, ReleaseState, ResolvedStage, RunId, StageOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

/// State of a stage during execution.
#[derive(Debug, Clone, PartialEq)]
pub enum StageState {
    Pending,
    Succeeded,
    /// Succeeded and stopped the run, e.g. no release necessary.
    Halted { reason: String },
    Failed { message: String },
    Skipped { reason: String },
}

impl StageState {
    pub fn is_success(&self) -> bool {
        matches!(self, StageState::Succeeded | StageState::Halted { .. })
    }
}

/// Final state of one stage.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub index: usize,
    pub name: String,
    pub capability: Capability,
    pub state: StageState,
}

/// Event emitted during pipeline execution.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted { index: usize, stage: String },
    StageCompleted { index: usize, stage: String, success: bool },
    StageSkipped { index: usize, stage: String, reason: String },
    PipelineCompleted { success: bool },
}

/// Result of a pipeline execution.
#[derive(Debug)]
pub struct PipelineResult {
    pub run_id: RunId,
    pub success: bool,
    /// One report per stage, in execution order.
    pub stages: Vec<StageReport>,
    /// Release state after the last executed stage.
    pub state: ReleaseState,
}

impl PipelineResult {
    /// Reason the run stopped early without failing, if it did.
    pub fn halted(&self) -> Option<&str> {
        self.stages.iter().find_map(|s| match &s.state {
            StageState::Halted { reason } => Some(reason.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("stage '{stage}' needs a {capability} collaborator but none is bound")]
    Unbound {
        stage: String,
        capability: Capability,
    },
}

/// Runs composed stages against bound collaborators.
#[derive(Clone, Default)]
pub struct PipelineRunner {
    bindings: HashMap<Capability, Arc<dyn Collaborator>>,
}

type BoundStage = (ResolvedStage, Arc<dyn Collaborator>);

impl PipelineRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the collaborator that performs `capability`.
    pub fn bind(&mut self, capability: Capability, collaborator: Arc<dyn Collaborator>) {
        self.bindings.insert(capability, collaborator);
    }

    pub fn with(mut self, capability: Capability, collaborator: Arc<dyn Collaborator>) -> Self {
        self.bind(capability, collaborator);
        self
    }

    /// Pair every stage with its collaborator, failing if any is unbound.
    fn bind_stages(&self, stages: &[ResolvedStage]) -> Result<Vec<BoundStage>, RunnerError> {
        stages
            .iter()
            .map(|stage| {
                self.bindings
                    .get(&stage.capability)
                    .map(|c| (stage.clone(), c.clone()))
                    .ok_or_else(|| RunnerError::Unbound {
                        stage: stage.name.clone(),
                        capability: stage.capability,
                    })
            })
            .collect()
    }

    /// Execute a pipeline, returning a channel of events and a handle to get the final result.
    ///
    /// Every stage is checked for a bound collaborator before anything is
    /// spawned, so an unbound stage never leaves a partially executed run.
    pub fn execute(
        &self,
        stages: &[ResolvedStage],
        state: ReleaseState,
    ) -> Result<
        (
            mpsc::Receiver<PipelineEvent>,
            tokio::task::JoinHandle<PipelineResult>,
        ),
        RunnerError,
    > {
        let plan = self.bind_stages(stages)?;
        let (tx, rx) = mpsc::channel(100);
        let run_id = RunId::new();

        info!(%run_id, stages = plan.len(), branch = %state.branch, "Starting release pipeline");

        let handle =
            tokio::spawn(async move { Self::execute_inner(run_id, plan, state, tx).await });

        Ok((rx, handle))
    }

    async fn execute_inner(
        run_id: RunId,
        plan: Vec<BoundStage>,
        mut state: ReleaseState,
        tx: mpsc::Sender<PipelineEvent>,
    ) -> PipelineResult {
        let mut reports: Vec<StageReport> = plan
            .iter()
            .map(|(stage, _)| StageReport {
                index: stage.index,
                name: stage.name.clone(),
                capability: stage.capability,
                state: StageState::Pending,
            })
            .collect();

        let mut success = true;
        // Set once a stage fails or halts; every later stage is skipped with it.
        let mut stopped: Option<String> = None;

        for (report, (stage, collaborator)) in reports.iter_mut().zip(plan.iter()) {
            if let Some(reason) = &stopped {
                report.state = StageState::Skipped {
                    reason: reason.clone(),
                };
                let _ = tx
                    .send(PipelineEvent::StageSkipped {
                        index: stage.index,
                        stage: stage.name.clone(),
                        reason: reason.clone(),
                    })
                    .await;
                continue;
            }

            let _ = tx
                .send(PipelineEvent::StageStarted {
                    index: stage.index,
                    stage: stage.name.clone(),
                })
                .await;

            let stage_ok = match collaborator.invoke(stage, &mut state).await {
                Ok(StageOutcome::Continue) => {
                    info!(%run_id, stage = %stage.name, collaborator = collaborator.name(), "Stage completed successfully");
                    report.state = StageState::Succeeded;
                    true
                }
                Ok(StageOutcome::Halt { reason }) => {
                    info!(%run_id, stage = %stage.name, %reason, "Stage halted the pipeline");
                    stopped = Some(format!("halted by '{}': {}", stage.name, reason));
                    report.state = StageState::Halted { reason };
                    true
                }
                Err(e) => {
                    error!(%run_id, stage = %stage.name, error = %e, "Stage failed");
                    success = false;
                    stopped = Some(format!("stage '{}' failed", stage.name));
                    report.state = StageState::Failed {
                        message: e.to_string(),
                    };
                    false
                }
            };

            let _ = tx
                .send(PipelineEvent::StageCompleted {
                    index: stage.index,
                    stage: stage.name.clone(),
                    success: stage_ok,
                })
                .await;
        }

        let _ = tx.send(PipelineEvent::PipelineCompleted { success }).await;

        PipelineResult {
            run_id,
            success,
            stages: reports,
            state,
        }
    }
}
