//! Distribution of a cumulative update installer to a set of servers
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Resolve    │──▶│   Acquire    │──▶│  Distribute  │──▶│   Cleanup    │
//! │ (catalog/inv)│   │ (fetch once) │   │ (per target) │   │  (optional)  │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! Resolution and download failures abort the run. Failures on a single
//! target are recorded in the report and the remaining targets still run.
//!
//! # Modules
//!
//! - [`workflow`]: `DistributionWorkflow` state machine
//! - [`paths`]: UNC and directory-rooted target paths, cache path
//! - [`types`]: requests, per-target outcomes, the run report
//! - [`error`]: errors that abort a run

pub mod error;
pub mod paths;
pub mod types;
pub mod workflow;

pub use error::WorkflowError;
pub use paths::{DistributionTarget, RemoteRoot, cache_path};
pub use types::{
    CachedArtifact, DistributionReport, DistributionRequest, TargetOutcome, TargetSelection,
    VersionSelection, WorkflowConfig, WorkflowStatus,
};
pub use workflow::{DistributionWorkflow, ResolvedLocator};
