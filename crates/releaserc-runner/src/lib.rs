//! Release pipeline execution for releaserc.
//!
//! Runs composed stages one at a time in configured order. A stage only
//! starts once the previous one succeeded.

pub mod orchestrator;

pub use orchestrator::{
    PipelineEvent, PipelineResult, PipelineRunner, RunnerError, StageReport, StageState,
};
