//! Top-level stress run: generate, dispatch, summarize.

use std::path::PathBuf;
use std::sync::Arc;

use crate::context::{RunContext, StagingPolicy};
use crate::core::{RunSummary, ServiceTarget, ToolPaths};
use crate::error::{Error, Result};
use crate::exec::CommandExecutor;
use crate::log::Logger;
use crate::orchestration::{summarize, TaskGenerator, WorkerPool, DEFAULT_BATCH_SIZE};
use crate::{slog, slog_debug, slog_warn};

/// Fully resolved parameters of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub target: ServiceTarget,
    pub workers: usize,
    pub iterations: usize,
    pub batch_size: usize,
    pub dataset: PathBuf,
    pub analysis: PathBuf,
    pub output_root: PathBuf,
    pub tools: ToolPaths,
    pub staging_policy: StagingPolicy,
}

impl RunOptions {
    pub fn new(
        target: ServiceTarget,
        dataset: impl Into<PathBuf>,
        analysis: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target,
            workers: 10,
            iterations: 5,
            batch_size: DEFAULT_BATCH_SIZE,
            dataset: dataset.into(),
            analysis: analysis.into(),
            output_root: output_root.into(),
            tools: ToolPaths::default(),
            staging_policy: StagingPolicy::default(),
        }
    }

    pub fn context(&self, logger: Logger) -> RunContext {
        RunContext::new(logger, self.target.clone(), &self.output_root)
            .with_tools(self.tools.clone())
            .with_staging_policy(self.staging_policy)
    }
}

/// Warn about tool binaries that are not on `PATH`. Missing tools are not
/// fatal: every command using them turns into a launch failure.
pub fn check_tools(tools: &ToolPaths, logger: &Logger) -> bool {
    let mut all_found = true;
    for binary in [&tools.client, &tools.dataset_tool] {
        if which::which(binary).is_err() {
            slog_warn!(logger, "Tool '{}' not found on PATH", binary);
            all_found = false;
        }
    }
    all_found
}

/// Run the whole stress sequence and summarize it.
///
/// Task failures are part of the summary. Errors are reserved for
/// conditions that end the run: invalid options, staging failures (after
/// the tasks already dispatched have completed and been summarized) and
/// crashed workers.
pub async fn run(
    opts: &RunOptions,
    executor: Arc<dyn CommandExecutor>,
    logger: &Logger,
) -> Result<RunSummary> {
    let ctx = opts.context(logger.clone());
    let pool = WorkerPool::new(&ctx, Arc::clone(&executor), opts.workers, opts.batch_size)?;

    if !opts.output_root.exists() {
        slog_debug!(logger, "Creating output root {}", opts.output_root.display());
        tokio::fs::create_dir_all(&opts.output_root).await?;
    }

    let info = format!(
        "{} with ntimes:{} with processors:{}",
        opts.target, opts.iterations, opts.workers
    );
    let mut generator = TaskGenerator::new(
        &ctx,
        executor,
        &opts.dataset,
        &opts.analysis,
        opts.iterations,
    );

    slog!(logger, "Starting {}", info);
    let results = match pool.run(&mut generator).await {
        Ok(results) => results,
        Err(Error::GenerationAborted { source, completed }) => {
            summarize(&completed, logger);
            return Err(Error::GenerationAborted { source, completed });
        }
        Err(e) => return Err(e),
    };
    slog_debug!(logger, "exiting {}", info);

    Ok(summarize(&results, logger))
}
