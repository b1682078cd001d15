//! Common types for the version catalog

/// Marker used by catalog files for a CU that can no longer be downloaded
pub const UNAVAILABLE_MARKER: &str = "N/A";

/// Resolved download location of a cumulative update
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Absolute download URL
    Available(String),
    /// The package is not obtainable (retracted, or never catalogued)
    Unavailable,
}

impl Locator {
    pub fn is_available(&self) -> bool {
        matches!(self, Locator::Available(_))
    }

    /// Returns the URL, or None for the unavailable sentinel
    pub fn url(&self) -> Option<&str> {
        match self {
            Locator::Available(url) => Some(url),
            Locator::Unavailable => None,
        }
    }

    /// Final path segment of the URL, used as the artifact file name
    ///
    /// Query string and fragment are ignored. Returns None for the sentinel,
    /// for unparsable URLs, and for URLs ending in a slash.
    pub fn file_name(&self) -> Option<String> {
        self.url().and_then(file_name_from_url)
    }
}

/// Final non-empty path segment of an absolute URL
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Available(url) => f.write_str(url),
            Locator::Unavailable => f.write_str(UNAVAILABLE_MARKER),
        }
    }
}

/// A single catalog row: `{product_line}_{revision}` -> locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: String,
    pub locator: Locator,
}

impl CatalogEntry {
    pub fn new(key: impl Into<String>, locator: Locator) -> Self {
        Self {
            key: key.into(),
            locator,
        }
    }

    /// Product line part of the key ("2016" for "2016_CU7")
    pub fn product_line(&self) -> &str {
        split_key(&self.key).map_or(self.key.as_str(), |(line, _)| line)
    }

    /// Revision part of the key ("CU7" for "2016_CU7")
    pub fn revision(&self) -> &str {
        split_key(&self.key).map_or("", |(_, revision)| revision)
    }
}

/// Result of a strict lookup, keeping apart the cases `resolve` conflates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available(String),
    /// Key is catalogued but its package was withdrawn
    Retracted,
    /// Key is not in the catalog
    Unknown,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available(url) => f.write_str(url),
            Availability::Retracted => f.write_str("retracted"),
            Availability::Unknown => f.write_str("unknown"),
        }
    }
}

/// Split a catalog key at its first underscore
pub(crate) fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('_')
        .filter(|(line, revision)| !line.is_empty() && !revision.is_empty())
}
