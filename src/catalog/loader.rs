//! Catalog file loading
//!
//! A catalog file is a JSON array kept in version order:
//!
//! ```json
//! [
//!   { "key": "2013_CU9", "url": "N/A" },
//!   { "key": "2013_CU18", "url": "https://download.example.com/Exchange2013-x64-cu18.exe" }
//! ]
//! ```
//!
//! `null`, a missing `url`, or `"N/A"` mark a CU that is no longer available.
//!
//! A catalog of Exchange 2013 and 2016 CUs is built into the binary and used
//! when no catalog file is present.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::catalog::error::CatalogError;
use crate::catalog::types::{CatalogEntry, Locator, UNAVAILABLE_MARKER};
use crate::catalog::version_catalog::VersionCatalog;

#[derive(Debug, Deserialize)]
struct RawEntry {
    key: String,
    #[serde(default)]
    url: Option<String>,
}

impl From<RawEntry> for CatalogEntry {
    fn from(raw: RawEntry) -> Self {
        let locator = match raw.url {
            Some(url) if is_available(&url) => Locator::Available(url.trim().to_string()),
            _ => Locator::Unavailable,
        };
        CatalogEntry::new(raw.key.trim(), locator)
    }
}

fn is_available(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && !url.eq_ignore_ascii_case(UNAVAILABLE_MARKER)
}

impl VersionCatalog {
    /// Parse a catalog from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawEntry> = serde_json::from_str(json)?;
        Self::new(raw.into_iter().map(CatalogEntry::from))
    }
}

/// Catalog text compiled into the binary
const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

/// Catalog shipped with the tool
pub fn default_catalog() -> Result<VersionCatalog, CatalogError> {
    let catalog = VersionCatalog::from_json_str(DEFAULT_CATALOG)?;
    info!("Using built-in catalog with {} entries", catalog.len());
    Ok(catalog)
}

/// Load a catalog file from disk
pub fn load_catalog(path: &Path) -> Result<VersionCatalog, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = VersionCatalog::from_json_str(&json)?;
    info!("Loaded {} catalog entries from {:?}", catalog.len(), path);
    Ok(catalog)
}
