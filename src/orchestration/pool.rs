//! Bounded worker pool for command dispatch.
//!
//! The caller's task is the producer: it pulls tasks from a [`TaskSource`]
//! in contiguous batches, renders them to command lines and hands each
//! batch to a fixed set of workers over a bounded channel. Workers run
//! their batch sequentially through the [`CommandExecutor`] and return
//! results tagged with the batch offset, so the final vector lines up with
//! submission order no matter which worker finished first.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::context::RunContext;
use crate::core::{CommandLine, CommandResult, Task, ToolPaths};
use crate::error::{Error, Result};
use crate::exec::CommandExecutor;
use crate::log::Logger;
use crate::orchestration::generator::TaskGenerator;
use crate::{slog_debug, slog_error};

/// Original chunk size of the stress tool.
pub const DEFAULT_BATCH_SIZE: usize = 6;

/// A lazy, single-pass stream of tasks.
///
/// An `Err` item ends the stream: the pool stops pulling, finishes what was
/// already pulled and reports the error.
#[async_trait]
pub trait TaskSource: Send {
    async fn next_task(&mut self) -> Option<Result<Task>>;
}

#[async_trait]
impl TaskSource for TaskGenerator {
    async fn next_task(&mut self) -> Option<Result<Task>> {
        TaskGenerator::next_task(self).await
    }
}

#[async_trait]
impl TaskSource for VecDeque<Task> {
    async fn next_task(&mut self) -> Option<Result<Task>> {
        self.pop_front().map(Ok)
    }
}

/// Contiguous run of rendered tasks starting at `offset` in submission order.
#[derive(Debug)]
struct Batch {
    offset: usize,
    commands: Vec<CommandLine>,
}

type BatchResults = Vec<(usize, Vec<CommandResult>)>;

/// Fixed-size pool of workers executing tasks in batches.
pub struct WorkerPool {
    executor: Arc<dyn CommandExecutor>,
    tools: ToolPaths,
    worker_count: usize,
    batch_size: usize,
    logger: Logger,
}

impl WorkerPool {
    /// Create a pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `worker_count` or `batch_size` is zero.
    pub fn new(
        ctx: &RunContext,
        executor: Arc<dyn CommandExecutor>,
        worker_count: usize,
        batch_size: usize,
    ) -> Result<Self> {
        if worker_count == 0 {
            return Err(Error::Validation(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if batch_size == 0 {
            return Err(Error::Validation(
                "Batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            executor,
            tools: ctx.tools.clone(),
            worker_count,
            batch_size,
            logger: ctx.logger.clone(),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Execute every task from `source` and return one result per task, in
    /// the order the tasks were pulled.
    ///
    /// Returns only after every dispatched task has finished. If the source
    /// yields nothing, no workers are started.
    ///
    /// # Errors
    ///
    /// - [`Error::GenerationAborted`] if the source yielded an error; it
    ///   carries the results of every task pulled before the error.
    /// - [`Error::TaskJoin`] if a worker panicked.
    pub async fn run<S>(&self, source: &mut S) -> Result<Vec<CommandResult>>
    where
        S: TaskSource + ?Sized,
    {
        let (mut batch, mut failure) = self.pull_batch(&mut *source).await;
        if batch.is_empty() {
            return match failure {
                Some(e) => Err(Error::GenerationAborted {
                    source: Box::new(e),
                    completed: Vec::new(),
                }),
                None => {
                    slog_debug!(self.logger, "WorkerPool::run no tasks, pool not started");
                    Ok(Vec::new())
                }
            };
        }

        slog_debug!(
            self.logger,
            "WorkerPool::run workers={} batch_size={}",
            self.worker_count,
            self.batch_size
        );

        let (tx, rx) = mpsc::channel::<Batch>(self.worker_count);
        let rx = Arc::new(Mutex::new(rx));
        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&rx),
                Arc::clone(&self.executor),
                self.logger.clone(),
            ));
        }
        // Workers own the only receiver handles; send fails once they are all gone.
        drop(rx);

        let mut collected: BatchResults = Vec::new();
        let mut submitted = 0;
        loop {
            let exhausted = batch.len() < self.batch_size || failure.is_some();
            if !batch.is_empty() {
                let len = batch.len();
                let commands = batch
                    .iter()
                    .map(|task| task.command_line(&self.tools))
                    .collect();
                if tx
                    .send(Batch {
                        offset: submitted,
                        commands,
                    })
                    .await
                    .is_err()
                {
                    // Every receiver is gone, which only happens if all
                    // workers died. The join below reports why.
                    break;
                }
                submitted += len;
            }

            if let Some(joined) = workers.try_join_next() {
                match joined {
                    Ok(done) => collected.extend(done),
                    Err(e) => return Err(abort(&mut workers, &self.logger, e)),
                }
            }

            if exhausted {
                break;
            }
            (batch, failure) = self.pull_batch(&mut *source).await;
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(done) => collected.extend(done),
                Err(e) => return Err(abort(&mut workers, &self.logger, e)),
            }
        }

        collected.sort_by_key(|(offset, _)| *offset);
        let results: Vec<CommandResult> = collected
            .into_iter()
            .flat_map(|(_, results)| results)
            .collect();
        debug_assert_eq!(results.len(), submitted);

        match failure {
            Some(e) => Err(Error::GenerationAborted {
                source: Box::new(e),
                completed: results,
            }),
            None => Ok(results),
        }
    }

    /// Pull up to `batch_size` tasks. A short batch means the source is
    /// exhausted or failed.
    async fn pull_batch<S>(&self, source: &mut S) -> (Vec<Task>, Option<Error>)
    where
        S: TaskSource + ?Sized,
    {
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match source.next_task().await {
                Some(Ok(task)) => batch.push(task),
                Some(Err(e)) => return (batch, Some(e)),
                None => break,
            }
        }
        (batch, None)
    }
}

fn abort(
    workers: &mut JoinSet<BatchResults>,
    logger: &Logger,
    err: tokio::task::JoinError,
) -> Error {
    slog_error!(logger, "Worker terminated abnormally: {}", err);
    workers.abort_all();
    Error::TaskJoin(err.to_string())
}

async fn worker_loop(
    worker_id: usize,
    rx: Arc<Mutex<mpsc::Receiver<Batch>>>,
    executor: Arc<dyn CommandExecutor>,
    logger: Logger,
) -> BatchResults {
    let mut done = Vec::new();
    loop {
        let next = { rx.lock().await.recv().await };
        let Some(batch) = next else {
            break;
        };
        slog_debug!(
            logger,
            "worker {} took batch offset={} len={}",
            worker_id,
            batch.offset,
            batch.commands.len()
        );

        let mut results = Vec::with_capacity(batch.commands.len());
        for command in &batch.commands {
            results.push(executor.execute(command).await);
        }
        done.push((batch.offset, results));
    }
    slog_debug!(logger, "worker {} exiting after {} batches", worker_id, done.len());
    done
}
