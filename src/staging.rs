//! Dataset staging.
//!
//! Every iteration imports its own copy of the source dataset under a fresh
//! identifier so the service sees a new dataset each time. Staging mutates
//! the filesystem and is only ever driven from the task generator, one call
//! at a time.

use std::path::Path;
use std::sync::Arc;

use crate::context::{RunContext, StagingPolicy};
use crate::core::{CommandResult, DatasetId, StagedDataset, ToolPaths};
use crate::error::{Error, Result};
use crate::exec::CommandExecutor;
use crate::log::Logger;
use crate::{slog, slog_debug, slog_warn};

pub struct DatasetStager {
    executor: Arc<dyn CommandExecutor>,
    tools: ToolPaths,
    policy: StagingPolicy,
    logger: Logger,
}

impl DatasetStager {
    pub fn new(ctx: &RunContext, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            tools: ctx.tools.clone(),
            policy: ctx.staging_policy,
            logger: ctx.logger.clone(),
        }
    }

    /// Stage `source` under a newly generated identifier.
    pub async fn stage(&self, source: &Path, output_root: &Path) -> Result<StagedDataset> {
        self.stage_with_id(source, output_root, DatasetId::new()).await
    }

    /// Stage `source` into `output_root/dataset-<identifier>`.
    ///
    /// The directory must not exist yet. The copy and identifier rewrite are
    /// delegated to the dataset tool; their failures abort staging only under
    /// [`StagingPolicy::FailFast`].
    pub async fn stage_with_id(
        &self,
        source: &Path,
        output_root: &Path,
        identifier: DatasetId,
    ) -> Result<StagedDataset> {
        let basename = source.file_name().ok_or_else(|| {
            Error::Validation(format!("Dataset path has no file name: {}", source.display()))
        })?;

        let working_dir = output_root.join(identifier.dir_name());
        slog_debug!(
            self.logger,
            "DatasetStager::stage source={} dir={}",
            source.display(),
            working_dir.display()
        );
        tokio::fs::create_dir(&working_dir)
            .await
            .map_err(|source| Error::Staging {
                path: working_dir.clone(),
                source,
            })?;

        let copied = self
            .executor
            .execute(&self.tools.copy_dataset(source, &working_dir))
            .await;
        self.check_step("copyto", copied)?;

        let dataset_file = working_dir.join(basename);
        let rewritten = self
            .executor
            .execute(&self.tools.new_uuid(&dataset_file))
            .await;
        self.check_step("newuuid", rewritten)?;

        Ok(StagedDataset {
            working_dir,
            dataset_file,
            identifier,
        })
    }

    fn check_step(&self, step: &str, result: CommandResult) -> Result<()> {
        slog!(self.logger, "{}", result);
        if result.is_success() {
            return Ok(());
        }
        match self.policy {
            StagingPolicy::LogAndContinue => {
                slog_warn!(self.logger, "Staging step '{}' failed, continuing", step);
                Ok(())
            }
            StagingPolicy::FailFast => Err(Error::StagingStep {
                step: step.to_string(),
                result,
            }),
        }
    }
}
