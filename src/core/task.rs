//! Task data model.
//!
//! A task is one external command to run against the service. The set of
//! tasks is closed: every variant renders to a command line through the
//! exhaustive match in [`Task::command_line`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::dataset::StagedDataset;

/// Default service client binary.
pub const DEFAULT_CLIENT: &str = "pbservice";
/// Default dataset tool binary.
pub const DEFAULT_DATASET_TOOL: &str = "dataset";

/// Host and port of the service under load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceTarget {
    pub host: String,
    pub port: u16,
}

impl ServiceTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn host_arg(&self) -> String {
        format!("--host={}", self.host)
    }

    fn port_arg(&self) -> String {
        format!("--port={}", self.port)
    }
}

impl std::fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Binaries invoked for service calls and dataset staging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub client: String,
    pub dataset_tool: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT.to_string(),
            dataset_tool: DEFAULT_DATASET_TOOL.to_string(),
        }
    }
}

impl ToolPaths {
    /// `<dataset-tool> copyto <src> <dest>`
    pub fn copy_dataset(&self, source: &Path, dest_dir: &Path) -> CommandLine {
        CommandLine::new(
            &self.dataset_tool,
            [
                "copyto".to_string(),
                source.display().to_string(),
                dest_dir.display().to_string(),
            ],
        )
    }

    /// `<dataset-tool> newuuid <file>`
    pub fn new_uuid(&self, dataset_file: &Path) -> CommandLine {
        CommandLine::new(
            &self.dataset_tool,
            ["newuuid".to_string(), dataset_file.display().to_string()],
        )
    }
}

/// A concrete program invocation. Arguments are passed to the process
/// as-is; no shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", shell_escape(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_escape(arg))?;
        }
        Ok(())
    }
}

fn shell_escape(s: &str) -> String {
    if !s.is_empty()
        && s.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '=' | ':' | ',')
        })
    {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

/// Discriminant of a [`Task`], for matching on the shape of a task stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    StatusCheck,
    ImportDataset,
    RunAnalysis,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::StatusCheck => write!(f, "status"),
            TaskKind::ImportDataset => write!(f, "import-dataset"),
            TaskKind::RunAnalysis => write!(f, "run-analysis"),
        }
    }
}

/// One unit of work against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    StatusCheck {
        target: ServiceTarget,
    },
    ImportDataset {
        target: ServiceTarget,
        dataset: StagedDataset,
    },
    RunAnalysis {
        target: ServiceTarget,
        analysis_spec: PathBuf,
    },
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::StatusCheck { .. } => TaskKind::StatusCheck,
            Task::ImportDataset { .. } => TaskKind::ImportDataset,
            Task::RunAnalysis { .. } => TaskKind::RunAnalysis,
        }
    }

    pub fn target(&self) -> &ServiceTarget {
        match self {
            Task::StatusCheck { target }
            | Task::ImportDataset { target, .. }
            | Task::RunAnalysis { target, .. } => target,
        }
    }

    /// Render this task into the service client invocation.
    pub fn command_line(&self, tools: &ToolPaths) -> CommandLine {
        let target = self.target();
        let mut args = vec![
            self.kind().to_string(),
            target.host_arg(),
            target.port_arg(),
        ];
        match self {
            Task::StatusCheck { .. } => {}
            Task::ImportDataset { dataset, .. } => {
                args.push(dataset.dataset_file.display().to_string());
            }
            Task::RunAnalysis { analysis_spec, .. } => {
                args.push("--block".to_string());
                args.push(analysis_spec.display().to_string());
            }
        }
        CommandLine::new(&tools.client, args)
    }
}
