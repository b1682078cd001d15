//! Requests, outcomes and reports of a distribution run

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::distribution::error::WorkflowError;
use crate::distribution::paths::{DistributionTarget, RemoteRoot};

/// Settings a workflow runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub temp_directory: PathBuf,
    pub destination_directory: String,
    pub remove_temp: bool,
    pub remote_root: RemoteRoot,
}

/// Which cumulative update to distribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelection {
    /// Exact catalog key, e.g. `2016_CU7`
    Key(String),
    /// Latest catalog entry of a product line, e.g. `2016`
    LatestForLine(String),
    /// Latest entry of the product line found in the installed inventory
    Detect,
    /// Download URL supplied directly, bypassing the catalog
    Locator(String),
}

/// Which hosts receive the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    Explicit(Vec<DistributionTarget>),
    /// Every server listed in the installed inventory
    Detect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionRequest {
    pub version: VersionSelection,
    pub targets: TargetSelection,
}

/// Installer downloaded into the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedArtifact {
    pub source_locator: String,
    pub local_path: PathBuf,
    pub file_name: String,
}

/// Result of distributing to one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum TargetOutcome {
    Copied,
    /// Destination file was already present; nothing was copied
    AlreadyExists,
    DirectoryCreateFailed(String),
    CopyFailed(String),
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TargetOutcome::Copied | TargetOutcome::AlreadyExists)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// The installer was acquired; individual targets may still have failed
    Completed,
    /// Resolution or download failed; no target was touched
    Aborted,
}

/// Everything a run produced
#[derive(Debug, Serialize)]
pub struct DistributionReport {
    pub status: WorkflowStatus,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<WorkflowError>,
    pub version_key: Option<String>,
    pub locator: Option<String>,
    pub artifact: Option<CachedArtifact>,
    /// True when the installer was downloaded during this run
    pub fetched: bool,
    /// Per-target outcomes in the order targets were processed
    pub outcomes: IndexMap<String, TargetOutcome>,
    pub cache_removed: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DistributionReport {
    pub(crate) fn started(started_at: DateTime<Utc>) -> Self {
        Self {
            status: WorkflowStatus::Aborted,
            error: None,
            version_key: None,
            locator: None,
            artifact: None,
            fetched: false,
            outcomes: IndexMap::new(),
            cache_removed: false,
            started_at,
            finished_at: started_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }

    /// Targets whose outcome was a failure
    pub fn failed_targets(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(target, _)| target.as_str())
            .collect()
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<WorkflowError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}
