//! Target and cache path derivation

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// How a target's root share is addressed
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemoteRoot {
    /// `\\{host}\` followed by the destination directory
    #[default]
    Unc,
    /// `{path}/{host}/` followed by the destination directory, for mounted
    /// shares or local staging trees
    Directory { path: PathBuf },
}

/// A host that receives a copy of the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionTarget {
    pub identifier: String,
    /// Path relative to the host's root share, e.g. `C$\Source`
    pub destination_directory: String,
}

impl DistributionTarget {
    pub fn new(identifier: impl Into<String>, destination_directory: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            destination_directory: destination_directory.into(),
        }
    }

    /// Directory on the target that receives the installer
    pub fn directory_path(&self, root: &RemoteRoot) -> PathBuf {
        let segments = destination_segments(&self.destination_directory);
        match root {
            RemoteRoot::Unc => {
                let mut path = format!(r"\\{}", self.identifier);
                for segment in segments {
                    path.push('\\');
                    path.push_str(segment);
                }
                PathBuf::from(path)
            }
            RemoteRoot::Directory { path } => {
                let mut path = path.join(&self.identifier);
                path.extend(segments);
                path
            }
        }
    }

    /// Full path of the installer on the target
    pub fn file_path(&self, root: &RemoteRoot, file_name: &str) -> PathBuf {
        let directory = self.directory_path(root);
        match root {
            RemoteRoot::Unc => {
                let mut path = directory.into_os_string();
                path.push("\\");
                path.push(file_name);
                PathBuf::from(path)
            }
            RemoteRoot::Directory { .. } => directory.join(file_name),
        }
    }
}

/// Local path the installer is downloaded to
pub fn cache_path(temp_directory: &Path, file_name: &str) -> PathBuf {
    temp_directory.join(file_name)
}

/// Destination directory split on either separator, empty parts dropped
fn destination_segments(destination: &str) -> impl Iterator<Item = &str> {
    destination
        .split(['\\', '/'])
        .filter(|segment| !segment.is_empty())
}
