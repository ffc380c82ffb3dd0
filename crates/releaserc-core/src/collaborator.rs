//! Collaborator trait.
//!
//! Collaborators perform the actual work of a stage: analysing commits,
//! generating notes, publishing and so on. They live outside this workspace;
//! the runner only sees this trait.

use async_trait::async_trait;

use crate::Result;
use crate::pipeline::ResolvedStage;
use crate::release::ReleaseState;

/// How a successful stage affects the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Proceed to the next stage.
    Continue,
    /// Stop the run without failing it, e.g. when no release is necessary.
    Halt { reason: String },
}

/// Trait for stage collaborators.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Perform the stage. Errors fail the run and no further stage executes.
    async fn invoke(&self, stage: &ResolvedStage, state: &mut ReleaseState)
    -> Result<StageOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Capability, StageOptions};
    use crate::release::{NextRelease, ReleaseType};

    struct FixedAnalyzer;

    #[async_trait]
    impl Collaborator for FixedAnalyzer {
        fn name(&self) -> &str {
            "fixed-analyzer"
        }

        async fn invoke(
            &self,
            _stage: &ResolvedStage,
            state: &mut ReleaseState,
        ) -> Result<StageOutcome> {
            state.release_type = Some(ReleaseType::Minor);
            state.next_release = Some(NextRelease::new("1.2.0"));
            Ok(StageOutcome::Continue)
        }
    }

    #[tokio::test]
    async fn test_collaborator_updates_state() {
        let stage = ResolvedStage {
            index: 0,
            name: "@semantic-release/commit-analyzer".to_string(),
            capability: Capability::CommitAnalysis,
            options: StageOptions::new(),
        };
        let mut state = ReleaseState::for_branch("main");

        let collaborator: Box<dyn Collaborator> = Box::new(FixedAnalyzer);
        let outcome = collaborator.invoke(&stage, &mut state).await.unwrap();

        assert_eq!(outcome, StageOutcome::Continue);
        assert_eq!(state.release_type, Some(ReleaseType::Minor));
        assert_eq!(state.next_release.unwrap().version, "1.2.0");
    }
}
