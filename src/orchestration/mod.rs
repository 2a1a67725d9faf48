//! Task generation, parallel dispatch and result aggregation.
//!
//! The generator runs on the caller's task and performs all filesystem
//! staging; the pool only executes already-rendered command lines; the
//! aggregator turns the ordered results into a run summary.

mod generator;
mod pool;
mod summary;

pub use generator::{TaskGenerator, TASKS_PER_ITERATION};
pub use pool::{TaskSource, WorkerPool, DEFAULT_BATCH_SIZE};
pub use summary::summarize;
