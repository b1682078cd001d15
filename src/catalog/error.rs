use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Malformed catalog key {0:?}: expected \"{{product_line}}_{{revision}}\"")]
    MalformedKey(String),

    #[error("Duplicate catalog key: {0}")]
    DuplicateKey(String),

    #[error("Invalid locator for {key}: {reason}")]
    InvalidLocator { key: String, reason: String },

    #[error("Failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}
