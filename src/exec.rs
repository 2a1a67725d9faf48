//! External command execution.
//!
//! [`CommandExecutor`] is the seam between the engine and the outside
//! world. [`ProcessExecutor`] runs real processes; tests substitute scripted
//! executors.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::{CommandLine, CommandResult};
use crate::log::Logger;
use crate::{slog_debug, slog_error, slog_trace};

/// Exit code reported when a command could not be started at all.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = 127;

/// Runs one command line to completion.
///
/// Implementations never fail: a nonzero exit is a normal result and a
/// launch failure is reported as a result with [`LAUNCH_FAILURE_EXIT_CODE`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &CommandLine) -> CommandResult;
}

/// Executes commands as child processes via `tokio::process`.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    logger: Logger,
}

impl ProcessExecutor {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &CommandLine) -> CommandResult {
        let rendered = command.to_string();
        slog_debug!(self.logger, "ProcessExecutor::execute cmd={}", rendered);

        let output = match Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let result = CommandResult::new(
                    rendered,
                    LAUNCH_FAILURE_EXIT_CODE,
                    "",
                    format!("Failed to launch '{}': {}", command.program(), e),
                );
                slog_error!(self.logger, "{}", result);
                return result;
            }
        };

        let result = CommandResult::new(
            rendered,
            exit_code(&output.status),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        if result.is_success() {
            slog_debug!(self.logger, "{}", result);
        } else {
            slog_error!(self.logger, "{}", result);
        }
        slog_trace!(self.logger, "stdout ({} bytes): {}", result.stdout.len(), result.stdout);
        result
    }
}

fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
