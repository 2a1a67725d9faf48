use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::{ExitPolicy, StagingPolicy};
use crate::core::task::{DEFAULT_CLIENT, DEFAULT_DATASET_TOOL};
use crate::core::ToolPaths;
use crate::log::Logger;
use crate::orchestration::DEFAULT_BATCH_SIZE;
use crate::{slog_debug, Result};

/// Reference dataset shipped with the server test data, relative to the
/// working directory.
pub const DEFAULT_DATASET: &str =
    "test-data/smrtserver-testdata/ds-references/mk-01/mk_name_01/referenceset.xml";
/// Dev diagnostic analysis spec, relative to the working directory.
pub const DEFAULT_ANALYSIS: &str =
    "smrt-server-analysis/src/test/resources/analysis-dev-diagnostic-01.json";
/// Staging root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "test-output";

/// Optional TOML configuration. Every field falls back to a built-in
/// default; command-line flags take precedence over both.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub client: Option<String>,
    pub dataset_tool: Option<String>,
    pub dataset: Option<String>,
    pub analysis: Option<String>,
    pub output_dir: Option<String>,
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub strict_staging: bool,
    #[serde(default)]
    pub fail_on_error: bool,
}

impl Config {
    pub fn load(path: &Path, logger: &Logger) -> Result<Self> {
        slog_debug!(logger, "Config::load path={}", path.display());
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        slog_debug!(
            logger,
            "Config loaded: client={:?}, dataset_tool={:?}, batch_size={:?}",
            config.client,
            config.dataset_tool,
            config.batch_size
        );
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>, logger: &Logger) -> Result<Self> {
        match path {
            Some(path) => Self::load(path, logger),
            None => {
                slog_debug!(logger, "No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn tools(&self) -> ToolPaths {
        ToolPaths {
            client: self
                .client
                .clone()
                .unwrap_or_else(|| DEFAULT_CLIENT.to_string()),
            dataset_tool: self
                .dataset_tool
                .clone()
                .unwrap_or_else(|| DEFAULT_DATASET_TOOL.to_string()),
        }
    }

    pub fn effective_dataset(&self) -> &str {
        self.dataset.as_deref().unwrap_or(DEFAULT_DATASET)
    }

    pub fn effective_analysis(&self) -> &str {
        self.analysis.as_deref().unwrap_or(DEFAULT_ANALYSIS)
    }

    pub fn effective_output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn staging_policy(&self) -> StagingPolicy {
        if self.strict_staging {
            StagingPolicy::FailFast
        } else {
            StagingPolicy::LogAndContinue
        }
    }

    pub fn exit_policy(&self) -> ExitPolicy {
        if self.fail_on_error {
            ExitPolicy::NonZeroOnFailure
        } else {
            ExitPolicy::AlwaysZero
        }
    }
}

/// Expand `~/` and anchor relative paths at `cwd`.
pub fn resolve_path(path: &str, cwd: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
