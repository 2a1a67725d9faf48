//! Explicit run context handed to every component.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::{ServiceTarget, ToolPaths};
use crate::log::Logger;

/// What to do when a dataset tool step exits nonzero during staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingPolicy {
    /// Log the failed step and hand the dataset to the import task anyway.
    #[default]
    LogAndContinue,
    /// Abort generation on the first failed step.
    FailFast,
}

/// How task failures map to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Exit 0 regardless of task failures; only report them in the log.
    #[default]
    AlwaysZero,
    /// Exit 1 when any task failed.
    NonZeroOnFailure,
}

impl ExitPolicy {
    pub fn exit_code(&self, failed: usize) -> i32 {
        match self {
            ExitPolicy::AlwaysZero => 0,
            ExitPolicy::NonZeroOnFailure if failed > 0 => 1,
            ExitPolicy::NonZeroOnFailure => 0,
        }
    }
}

/// Everything a run needs that would otherwise be ambient process state.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub logger: Logger,
    pub target: ServiceTarget,
    /// Root under which `dataset-<uuid>` directories are created.
    pub output_root: PathBuf,
    pub tools: ToolPaths,
    pub staging_policy: StagingPolicy,
}

impl RunContext {
    pub fn new(logger: Logger, target: ServiceTarget, output_root: impl Into<PathBuf>) -> Self {
        Self {
            logger,
            target,
            output_root: output_root.into(),
            tools: ToolPaths::default(),
            staging_policy: StagingPolicy::default(),
        }
    }

    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_staging_policy(mut self, policy: StagingPolicy) -> Self {
        self.staging_policy = policy;
        self
    }
}
