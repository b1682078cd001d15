//! File-system access for the cache and remote shares
//!
//! Remote UNC paths (`\\host\share\...`) are ordinary paths here.

use std::io;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::transfer::{discard_part, part_path};

#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy `from` to `to`, returning the number of bytes copied
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// `std::fs`-backed file system
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    /// Copies through a `.part` sibling so an interrupted copy never sits at `to`
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let part = part_path(to);
        let copied = std::fs::copy(from, &part).and_then(|n| {
            std::fs::rename(&part, to)?;
            Ok(n)
        });
        if copied.is_err() {
            discard_part(&part);
        }
        copied
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
