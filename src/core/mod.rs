//! Core data model for stress runs.
//!
//! Tasks, the staged datasets they reference, and the results produced by
//! running them. Everything here is an immutable value type.

pub mod dataset;
pub mod result;
pub mod task;

pub use dataset::{DatasetId, StagedDataset};
pub use result::{CommandResult, RunSummary};
pub use task::{CommandLine, ServiceTarget, Task, TaskKind, ToolPaths};
