//! Result aggregation.

use crate::core::{CommandResult, RunSummary};
use crate::log::Logger;
use crate::slog_error;

/// Partition `results` into a [`RunSummary`], logging each failure and the
/// final count.
pub fn summarize(results: &[CommandResult], logger: &Logger) -> RunSummary {
    let failures: Vec<CommandResult> = results
        .iter()
        .filter(|r| !r.is_success())
        .cloned()
        .collect();

    for failure in &failures {
        slog_error!(logger, "{}", failure);
    }

    let summary = RunSummary {
        total: results.len(),
        failures,
    };
    slog_error!(logger, "{}", summary);
    summary
}
