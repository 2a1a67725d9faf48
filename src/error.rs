use std::path::PathBuf;

use thiserror::Error;

use crate::core::CommandResult;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to create staging directory {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Staging step '{step}' failed with exit code {}", result.exit_code)]
    StagingStep { step: String, result: CommandResult },

    #[error("Task generation aborted after {} completed tasks: {source}", completed.len())]
    GenerationAborted {
        #[source]
        source: Box<Error>,
        completed: Vec<CommandResult>,
    },

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
