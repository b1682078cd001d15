//! Inventory backed by a JSON export of the Exchange server list
//!
//! Accepts the output of
//! `Get-ExchangeServer | Select-Object Name,AdminDisplayVersion | ConvertTo-Json`,
//! either as an array or as a single object. `AdminDisplayVersion` may be the
//! display string ("Version 15.1 (Build 2507.6)") or the serialized version
//! object with `Major`/`Minor`/`Build`/`Revision` fields.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::catalog::ProductVersion;
use crate::inventory::{Inventory, InventoryError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerList {
    Many(Vec<ServerRecord>),
    One(ServerRecord),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServerRecord {
    name: String,
    #[serde(default)]
    admin_display_version: Option<VersionField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionField {
    Text(String),
    #[serde(rename_all = "PascalCase")]
    Parts {
        major: u32,
        minor: u32,
        #[serde(default)]
        build: Option<u32>,
        #[serde(default)]
        revision: Option<u32>,
    },
}

impl VersionField {
    fn to_version(&self) -> Option<ProductVersion> {
        match self {
            VersionField::Text(text) => ProductVersion::parse(text),
            VersionField::Parts {
                major,
                minor,
                build,
                revision,
            } => Some(ProductVersion {
                major: *major,
                minor: *minor,
                build: *build,
                revision: *revision,
            }),
        }
    }
}

/// Inventory read from a server list export on disk
pub struct FileInventory {
    path: PathBuf,
}

impl FileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_servers(&self) -> Result<Vec<ServerRecord>, InventoryError> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            InventoryError::Unavailable(format!("failed to read {:?}: {}", self.path, e))
        })?;
        let list: ServerList = serde_json::from_str(&json).map_err(|e| {
            InventoryError::Unavailable(format!("failed to parse {:?}: {}", self.path, e))
        })?;

        let servers = match list {
            ServerList::Many(servers) => servers,
            ServerList::One(server) => vec![server],
        };
        debug!("Read {} servers from {:?}", servers.len(), self.path);
        Ok(servers)
    }
}

impl Inventory for FileInventory {
    fn installed_versions(&self) -> Result<Vec<ProductVersion>, InventoryError> {
        let servers = self.read_servers()?;
        let mut versions = Vec::with_capacity(servers.len());

        for server in servers {
            match server.admin_display_version.as_ref().map(VersionField::to_version) {
                Some(Some(version)) => versions.push(version),
                Some(None) => {
                    return Err(InventoryError::Unavailable(format!(
                        "unparsable version for server {}",
                        server.name
                    )));
                }
                None => warn!("Server {} has no version in inventory; skipping", server.name),
            }
        }

        Ok(versions)
    }

    fn installed_servers(&self) -> Result<Vec<String>, InventoryError> {
        Ok(self
            .read_servers()?
            .into_iter()
            .map(|server| server.name)
            .filter(|name| !name.trim().is_empty())
            .collect())
    }
}
