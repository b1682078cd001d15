//! Installed-product inventory
//!
//! Supplies the installed Exchange versions and server names used when the
//! caller asks for automatic version or target detection.
//!
//! - [`file`]: inventory backed by a JSON export of the server list

pub mod file;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tracing::debug;

use crate::catalog::ProductVersion;

pub use file::FileInventory;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Inventory is not available: {0}")]
    Unavailable(String),

    #[error("No installed product versions found")]
    NoVersions,

    #[error("No installed servers found")]
    NoServers,

    #[error("Unrecognized product version {0}")]
    UnrecognizedVersion(ProductVersion),

    #[error("Installed servers span several product lines: {0:?}")]
    MixedProductLines(Vec<&'static str>),
}

/// Source of installed product versions and server identifiers
#[cfg_attr(test, automock)]
pub trait Inventory: Send + Sync {
    /// Versions of the installed products, one per server
    fn installed_versions(&self) -> Result<Vec<ProductVersion>, InventoryError>;

    /// Names of the installed servers
    fn installed_servers(&self) -> Result<Vec<String>, InventoryError>;
}

/// Product line shared by every installed version
///
/// Fails when the inventory is empty, reports a version outside the product
/// line table, or mixes product lines.
pub fn detect_product_line(inventory: &dyn Inventory) -> Result<&'static str, InventoryError> {
    let versions = inventory.installed_versions()?;
    debug!("Installed versions: {:?}", versions);

    let mut lines: Vec<&'static str> = Vec::new();
    for version in versions {
        let line = version
            .product_line()
            .ok_or(InventoryError::UnrecognizedVersion(version))?;
        if !lines.contains(&line) {
            lines.push(line);
        }
    }

    match lines.len() {
        0 => Err(InventoryError::NoVersions),
        1 => Ok(lines[0]),
        _ => Err(InventoryError::MixedProductLines(lines)),
    }
}

/// Installed server names, failing when there are none
pub fn detect_servers(inventory: &dyn Inventory) -> Result<Vec<String>, InventoryError> {
    let servers = inventory.installed_servers()?;
    if servers.is_empty() {
        return Err(InventoryError::NoServers);
    }
    Ok(servers)
}
