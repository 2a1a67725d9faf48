//! Staged dataset model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Identifier embedded in a staged dataset.
///
/// Uses UUID v4 for generation and provides a short form display
/// for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub Uuid);

impl DatasetId {
    /// Create a new unique dataset identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }

    /// Name of the staging directory for this identifier.
    pub fn dir_name(&self) -> String {
        format!("dataset-{}", self.0)
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DatasetId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fresh working copy of the source dataset, created once per iteration.
///
/// Owned by the generator until it is moved into an import task; nothing
/// else ever writes to `working_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedDataset {
    /// `<output root>/dataset-<identifier>`
    pub working_dir: PathBuf,
    /// The copied descriptor file inside `working_dir`.
    pub dataset_file: PathBuf,
    pub identifier: DatasetId,
}
