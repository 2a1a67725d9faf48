pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod exec;
pub mod log;
pub mod run;
pub mod staging;

// Generation, dispatch and aggregation engine
pub mod orchestration;

pub use error::{Error, Result};
