//! Collaborators that move bytes: resource fetch and file-system access
//!
//! - [`fetcher`]: `Fetcher` trait and the reqwest-backed `HttpFetcher`
//! - [`fs`]: `FileSystem` trait and the `std::fs`-backed `LocalFileSystem`

pub mod fetcher;
pub mod fs;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

pub use fetcher::{FetchError, Fetcher, HttpFetcher};
pub use fs::{FileSystem, LocalFileSystem};

/// Suffix of in-progress transfers
pub const PART_SUFFIX: &str = ".part";

/// Sibling path a transfer writes to before it is renamed into place
pub fn part_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Remove a leftover in-progress file after a failed transfer
///
/// Returns false when a `.part` file could not be removed and is still on disk.
pub(crate) fn discard_part(part: &Path) -> bool {
    match std::fs::remove_file(part) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!("Failed to remove partial transfer {:?}: {}", part, e);
            false
        }
    }
}
