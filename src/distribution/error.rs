use thiserror::Error;

use crate::catalog::Availability;
use crate::transfer::FetchError;

/// Failures that abort a whole distribution run
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Version {key} is unknown or no longer available ({availability})")]
    UnknownOrUnavailableVersion {
        key: String,
        availability: Availability,
    },

    #[error("Automatic detection unavailable: {0}")]
    DetectionUnavailable(String),

    #[error("Failed to download {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Locator {0} does not name a downloadable file")]
    InvalidLocator(String),
}
