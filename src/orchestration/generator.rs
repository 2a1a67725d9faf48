//! Lazy task generation.
//!
//! The generator is the only producer of tasks and the only caller of the
//! dataset stager. Staging for an iteration completes before any task of
//! that iteration is handed out, so a worker never sees an unstaged dataset
//! and never performs filesystem staging itself.

use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::context::RunContext;
use crate::core::{DatasetId, ServiceTarget, StagedDataset, Task};
use crate::error::Result;
use crate::exec::CommandExecutor;
use crate::log::Logger;
use crate::slog_debug;
use crate::staging::DatasetStager;

/// Number of tasks emitted per iteration.
pub const TASKS_PER_ITERATION: usize = 4;

type IdSource = Box<dyn FnMut() -> Uuid + Send>;

/// Position inside one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    FirstStatus,
    Import,
    SecondStatus,
    Analysis,
}

/// Single-pass cursor over `4 x iterations` tasks.
///
/// Each iteration yields `StatusCheck, ImportDataset, StatusCheck,
/// RunAnalysis`. Pulling the first task of an iteration stages a new
/// dataset; if staging fails the error is yielded once and the cursor is
/// exhausted from then on.
pub struct TaskGenerator {
    stager: DatasetStager,
    target: ServiceTarget,
    dataset_path: PathBuf,
    analysis_spec: PathBuf,
    output_root: PathBuf,
    iterations: usize,
    iteration: usize,
    slot: Slot,
    staged: Option<StagedDataset>,
    next_id: IdSource,
    done: bool,
    logger: Logger,
}

impl TaskGenerator {
    pub fn new(
        ctx: &RunContext,
        executor: Arc<dyn CommandExecutor>,
        dataset_path: impl Into<PathBuf>,
        analysis_spec: impl Into<PathBuf>,
        iterations: usize,
    ) -> Self {
        Self {
            stager: DatasetStager::new(ctx, executor),
            target: ctx.target.clone(),
            dataset_path: dataset_path.into(),
            analysis_spec: analysis_spec.into(),
            output_root: ctx.output_root.clone(),
            iterations,
            iteration: 0,
            slot: Slot::FirstStatus,
            staged: None,
            next_id: Box::new(Uuid::new_v4),
            done: iterations == 0,
            logger: ctx.logger.clone(),
        }
    }

    /// Replace the identifier source used for staged datasets.
    pub fn with_id_source(mut self, source: impl FnMut() -> Uuid + Send + 'static) -> Self {
        self.next_id = Box::new(source);
        self
    }

    /// Tasks left to emit if nothing fails.
    pub fn remaining(&self) -> usize {
        if self.done {
            return 0;
        }
        let into_iteration = match self.slot {
            Slot::FirstStatus => 0,
            Slot::Import => 1,
            Slot::SecondStatus => 2,
            Slot::Analysis => 3,
        };
        (self.iterations - self.iteration) * TASKS_PER_ITERATION - into_iteration
    }

    /// Pull the next task, staging a dataset first when a new iteration
    /// begins.
    pub async fn next_task(&mut self) -> Option<Result<Task>> {
        if self.done {
            return None;
        }

        let task = match self.slot {
            Slot::FirstStatus => {
                slog_debug!(
                    self.logger,
                    "TaskGenerator: staging iteration {}/{}",
                    self.iteration + 1,
                    self.iterations
                );
                let id = DatasetId::from((self.next_id)());
                let staged = self
                    .stager
                    .stage_with_id(&self.dataset_path, &self.output_root, id)
                    .await;
                match staged {
                    Ok(staged) => self.staged = Some(staged),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
                self.slot = Slot::Import;
                self.status_check()
            }
            Slot::Import => {
                self.slot = Slot::SecondStatus;
                match self.staged.take() {
                    Some(dataset) => Task::ImportDataset {
                        target: self.target.clone(),
                        dataset,
                    },
                    // Unreachable: FirstStatus always stores a dataset before
                    // moving to Import.
                    None => return self.fuse(),
                }
            }
            Slot::SecondStatus => {
                self.slot = Slot::Analysis;
                self.status_check()
            }
            Slot::Analysis => {
                self.slot = Slot::FirstStatus;
                self.iteration += 1;
                if self.iteration == self.iterations {
                    self.done = true;
                }
                Task::RunAnalysis {
                    target: self.target.clone(),
                    analysis_spec: self.analysis_spec.clone(),
                }
            }
        };

        Some(Ok(task))
    }

    fn status_check(&self) -> Task {
        Task::StatusCheck {
            target: self.target.clone(),
        }
    }

    fn fuse(&mut self) -> Option<Result<Task>> {
        self.done = true;
        None
    }
}
