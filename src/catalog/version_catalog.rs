//! Ordered, read-only mapping from CU keys to download locators

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::error::CatalogError;
use crate::catalog::types::{Availability, CatalogEntry, Locator, split_key};

/// Matches plain cumulative update revisions ("CU7", "cu18")
static CU_REVISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^CU(\d+)$").expect("valid CU revision regex"));

/// Catalog of cumulative updates
///
/// Insertion order is the version order: the last entry of a product line is
/// its latest revision. The catalog never reorders entries.
#[derive(Debug, Clone, Default)]
pub struct VersionCatalog {
    entries: IndexMap<String, Locator>,
}

impl VersionCatalog {
    /// Build a catalog from entries in version order
    ///
    /// Rejects malformed keys, duplicate keys and available locators that are
    /// not absolute http(s) URLs naming a file.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::new();

        for entry in entries {
            if split_key(&entry.key).is_none() {
                return Err(CatalogError::MalformedKey(entry.key));
            }
            validate_locator(&entry)?;
            if map.contains_key(&entry.key) {
                return Err(CatalogError::DuplicateKey(entry.key));
            }
            map.insert(entry.key, entry.locator);
        }

        let catalog = Self { entries: map };
        catalog.warn_on_non_monotonic_revisions();
        debug!("Catalog built with {} entries", catalog.len());

        Ok(catalog)
    }

    /// Resolve a key to its locator
    ///
    /// Unknown keys and retracted keys both yield `Locator::Unavailable`.
    pub fn resolve(&self, key: &str) -> Locator {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or(Locator::Unavailable)
    }

    /// Strict lookup that tells a missing key apart from a retracted one
    pub fn lookup(&self, key: &str) -> Availability {
        match self.entries.get(key) {
            Some(Locator::Available(url)) => Availability::Available(url.clone()),
            Some(Locator::Unavailable) => Availability::Retracted,
            None => Availability::Unknown,
        }
    }

    /// Key of the last entry for a product line, available or not
    ///
    /// Returns None when no key starts with `{product_line}_`.
    pub fn latest_for_line(&self, product_line: &str) -> Option<&str> {
        let prefix = format!("{}_", product_line);
        self.entries
            .keys()
            .rev()
            .find(|key| key.starts_with(&prefix))
            .map(String::as_str)
    }

    /// All entries in version order
    pub fn entries(&self) -> impl Iterator<Item = CatalogEntry> + '_ {
        self.entries
            .iter()
            .map(|(key, locator)| CatalogEntry::new(key.clone(), locator.clone()))
    }

    /// Distinct product lines in first-seen order
    pub fn product_lines(&self) -> Vec<&str> {
        let mut lines: Vec<&str> = Vec::new();
        for key in self.entries.keys() {
            if let Some((line, _)) = split_key(key)
                && !lines.contains(&line)
            {
                lines.push(line);
            }
        }
        lines
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log product lines whose CU numbers do not strictly increase
    fn warn_on_non_monotonic_revisions(&self) {
        let mut last_seen: HashMap<&str, (u32, &str)> = HashMap::new();

        for key in self.entries.keys() {
            let Some((line, revision)) = split_key(key) else {
                continue;
            };
            let Some(number) = CU_REVISION
                .captures(revision)
                .and_then(|caps| caps[1].parse::<u32>().ok())
            else {
                continue;
            };

            if let Some((previous, previous_key)) = last_seen.get(line)
                && number <= *previous
            {
                warn!(
                    "Catalog order is not increasing for {}: {} follows {}",
                    line, key, previous_key
                );
            }
            last_seen.insert(line, (number, key.as_str()));
        }
    }
}

fn validate_locator(entry: &CatalogEntry) -> Result<(), CatalogError> {
    let Locator::Available(url) = &entry.locator else {
        return Ok(());
    };

    let invalid = |reason: String| CatalogError::InvalidLocator {
        key: entry.key.clone(),
        reason,
    };

    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if entry.locator.file_name().is_none() {
        return Err(invalid("URL does not name a file".to_string()));
    }

    Ok(())
}
