//! Fetch-once, copy-to-many distribution of a cumulative update installer

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::catalog::types::file_name_from_url;
use crate::catalog::{Availability, VersionCatalog};
use crate::distribution::error::WorkflowError;
use crate::distribution::paths::{DistributionTarget, RemoteRoot, cache_path};
use crate::distribution::types::{
    CachedArtifact, DistributionReport, DistributionRequest, TargetOutcome, TargetSelection,
    VersionSelection, WorkflowConfig, WorkflowStatus,
};
use crate::inventory::{Inventory, detect_product_line, detect_servers};
use crate::transfer::{Fetcher, FileSystem};

/// Locator chosen for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocator {
    /// Catalog key, absent when the caller supplied a URL
    pub key: Option<String>,
    pub url: String,
}

/// Runs resolve -> acquire -> distribute -> cleanup for one request
///
/// Targets are processed one at a time in the order supplied. A failure on one
/// target is recorded and the next target is attempted; only resolution and
/// download failures abort the run.
pub struct DistributionWorkflow {
    config: WorkflowConfig,
    catalog: Arc<VersionCatalog>,
    fetcher: Arc<dyn Fetcher>,
    fs: Arc<dyn FileSystem>,
    inventory: Option<Arc<dyn Inventory>>,
}

impl DistributionWorkflow {
    pub fn new(
        config: WorkflowConfig,
        catalog: Arc<VersionCatalog>,
        fetcher: Arc<dyn Fetcher>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            config,
            catalog,
            fetcher,
            fs,
            inventory: None,
        }
    }

    /// Attach the inventory used for automatic version and target detection
    pub fn with_inventory(mut self, inventory: Arc<dyn Inventory>) -> Self {
        self.inventory = Some(inventory);
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Target on `identifier` using the configured destination directory
    pub fn target(&self, identifier: impl Into<String>) -> DistributionTarget {
        DistributionTarget::new(identifier, self.config.destination_directory.clone())
    }

    /// Execute a request
    ///
    /// Never fails as a whole: fatal errors are reported with
    /// `WorkflowStatus::Aborted` and the error in the report.
    pub async fn run(&self, request: DistributionRequest) -> DistributionReport {
        let mut report = DistributionReport::started(Utc::now());

        match self.execute(request, &mut report).await {
            Ok(()) => {
                report.status = WorkflowStatus::Completed;
                info!(
                    "Distribution completed: {} targets, {} failed",
                    report.outcomes.len(),
                    report.failed_targets().len()
                );
            }
            Err(e) => {
                error!("Distribution aborted: {}", e);
                report.status = WorkflowStatus::Aborted;
                report.error = Some(e);
            }
        }

        report.finished_at = Utc::now();
        report
    }

    async fn execute(
        &self,
        request: DistributionRequest,
        report: &mut DistributionReport,
    ) -> Result<(), WorkflowError> {
        let resolved = self.resolve_locator(&request.version)?;
        report.version_key = resolved.key.clone();
        report.locator = Some(resolved.url.clone());

        let targets = self.resolve_targets(request.targets)?;

        let (artifact, fetched) = self.acquire_artifact(&resolved.url).await?;
        report.fetched = fetched;

        report.outcomes = self.distribute(&artifact, &targets).await;
        report.cache_removed = self.cleanup(&artifact, &report.outcomes);
        report.artifact = Some(artifact);

        Ok(())
    }

    /// Resolve the requested version to a download URL
    pub fn resolve_locator(
        &self,
        selection: &VersionSelection,
    ) -> Result<ResolvedLocator, WorkflowError> {
        let key = match selection {
            VersionSelection::Locator(url) => {
                if file_name_from_url(url).is_none() {
                    return Err(WorkflowError::InvalidLocator(url.clone()));
                }
                return Ok(ResolvedLocator {
                    key: None,
                    url: url.clone(),
                });
            }
            VersionSelection::Key(key) => key.clone(),
            VersionSelection::LatestForLine(line) => self.latest_key(line)?,
            VersionSelection::Detect => {
                let line = self.detect_line()?;
                self.latest_key(line)?
            }
        };

        match self.catalog.lookup(&key) {
            Availability::Available(url) => {
                info!("Resolved {} to {}", key, url);
                Ok(ResolvedLocator {
                    key: Some(key),
                    url,
                })
            }
            availability => Err(WorkflowError::UnknownOrUnavailableVersion { key, availability }),
        }
    }

    fn latest_key(&self, line: &str) -> Result<String, WorkflowError> {
        let key = self
            .catalog
            .latest_for_line(line)
            .ok_or_else(|| WorkflowError::UnknownOrUnavailableVersion {
                key: line.to_string(),
                availability: Availability::Unknown,
            })?;
        debug!("Latest catalog entry for {} is {}", line, key);
        Ok(key.to_string())
    }

    fn detect_line(&self) -> Result<&'static str, WorkflowError> {
        let inventory = self.inventory()?;
        let line = detect_product_line(inventory.as_ref())
            .map_err(|e| WorkflowError::DetectionUnavailable(e.to_string()))?;
        info!("Detected installed product line {}", line);
        Ok(line)
    }

    fn inventory(&self) -> Result<&Arc<dyn Inventory>, WorkflowError> {
        self.inventory.as_ref().ok_or_else(|| {
            WorkflowError::DetectionUnavailable("no inventory configured".to_string())
        })
    }

    /// Resolve the target list, dropping repeated hosts
    pub fn resolve_targets(
        &self,
        selection: TargetSelection,
    ) -> Result<Vec<DistributionTarget>, WorkflowError> {
        let targets = match selection {
            TargetSelection::Explicit(targets) => targets,
            TargetSelection::Detect => {
                let inventory = self.inventory()?;
                detect_servers(inventory.as_ref())
                    .map_err(|e| WorkflowError::DetectionUnavailable(e.to_string()))?
                    .into_iter()
                    .map(|server| self.target(server))
                    .collect()
            }
        };

        let mut unique: Vec<DistributionTarget> = Vec::with_capacity(targets.len());
        for target in targets {
            if unique
                .iter()
                .any(|t| t.identifier.eq_ignore_ascii_case(&target.identifier))
            {
                warn!("Ignoring repeated target {}", target.identifier);
                continue;
            }
            unique.push(target);
        }

        Ok(unique)
    }

    /// Make the installer available in the local cache
    ///
    /// An existing file at the cache path is reused as-is. Returns whether a
    /// download happened.
    pub async fn acquire_artifact(
        &self,
        url: &str,
    ) -> Result<(CachedArtifact, bool), WorkflowError> {
        let file_name =
            file_name_from_url(url).ok_or_else(|| WorkflowError::InvalidLocator(url.to_string()))?;
        let artifact = CachedArtifact {
            source_locator: url.to_string(),
            local_path: cache_path(&self.config.temp_directory, &file_name),
            file_name,
        };

        if self.fs.exists(&artifact.local_path) {
            info!(
                "{} already downloaded to {:?}; skipping download",
                artifact.file_name, artifact.local_path
            );
            return Ok((artifact, false));
        }

        info!("Downloading {} to {:?}", url, artifact.local_path);
        self.fetcher
            .fetch(url, &artifact.local_path)
            .await
            .map_err(|source| WorkflowError::FetchFailed {
                url: url.to_string(),
                source,
            })?;

        Ok((artifact, true))
    }

    /// Copy the cached installer to every target
    ///
    /// Targets are handled one at a time; each target's file-system calls run
    /// on the blocking pool.
    pub async fn distribute(
        &self,
        artifact: &CachedArtifact,
        targets: &[DistributionTarget],
    ) -> IndexMap<String, TargetOutcome> {
        let mut outcomes = IndexMap::with_capacity(targets.len());

        for target in targets {
            let fs = Arc::clone(&self.fs);
            let root = self.config.remote_root.clone();
            let task_artifact = artifact.clone();
            let task_target = target.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                distribute_to(fs.as_ref(), &root, &task_artifact, &task_target)
            })
            .await
            .unwrap_or_else(|e| TargetOutcome::CopyFailed(format!("copy task failed: {}", e)));

            match &outcome {
                TargetOutcome::Copied => info!("Copied to {}", target.identifier),
                TargetOutcome::AlreadyExists => {
                    info!(
                        "{} already exists on {}",
                        artifact.file_name, target.identifier
                    )
                }
                TargetOutcome::DirectoryCreateFailed(detail)
                | TargetOutcome::CopyFailed(detail) => {
                    warn!("Failed to distribute to {}: {}", target.identifier, detail)
                }
            }
            outcomes.insert(target.identifier.clone(), outcome);
        }

        outcomes
    }

    /// Delete the cached installer when requested and every target succeeded
    ///
    /// Returns whether the cache file was removed.
    pub fn cleanup(
        &self,
        artifact: &CachedArtifact,
        outcomes: &IndexMap<String, TargetOutcome>,
    ) -> bool {
        if !self.config.remove_temp {
            return false;
        }

        let failed = outcomes.values().filter(|o| !o.is_success()).count();
        if failed > 0 {
            info!(
                "Keeping {:?}: {} targets failed",
                artifact.local_path, failed
            );
            return false;
        }

        match self.fs.remove_file(&artifact.local_path) {
            Ok(()) => {
                info!("Removed {:?}", artifact.local_path);
                true
            }
            Err(e) => {
                warn!("Failed to remove {:?}: {}", artifact.local_path, e);
                false
            }
        }
    }
}

fn distribute_to(
    fs: &dyn FileSystem,
    root: &RemoteRoot,
    artifact: &CachedArtifact,
    target: &DistributionTarget,
) -> TargetOutcome {
    let directory = target.directory_path(root);
    if !fs.exists(&directory) {
        debug!("Creating {:?}", directory);
        if let Err(e) = fs.create_dir_all(&directory) {
            return TargetOutcome::DirectoryCreateFailed(format!("{:?}: {}", directory, e));
        }
    }

    let file = target.file_path(root, &artifact.file_name);
    if fs.exists(&file) {
        return TargetOutcome::AlreadyExists;
    }

    debug!("Copying {:?} to {:?}", artifact.local_path, file);
    match fs.copy(&artifact.local_path, &file) {
        Ok(_) => TargetOutcome::Copied,
        Err(e) => TargetOutcome::CopyFailed(format!("{:?}: {}", file, e)),
    }
}
