//! In-memory collaborators for workflow tests

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cu_distributor::catalog::{CatalogEntry, Locator, VersionCatalog};
use cu_distributor::transfer::{FetchError, Fetcher, FileSystem};

/// File system kept in memory, with injectable failures
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    directories: Mutex<HashSet<PathBuf>>,
    failing_directories: Mutex<HashSet<PathBuf>>,
    failing_copies: Mutex<HashSet<PathBuf>>,
    copies: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MemoryFileSystem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, contents: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), contents.to_vec());
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn fail_create_dir(&self, path: impl Into<PathBuf>) {
        self.failing_directories.lock().unwrap().insert(path.into());
    }

    pub fn fail_copy_to(&self, path: impl Into<PathBuf>) {
        self.failing_copies.lock().unwrap().insert(path.into());
    }

    /// (from, to) pairs of every successful copy, in call order
    pub fn copies(&self) -> Vec<(PathBuf, PathBuf)> {
        self.copies.lock().unwrap().clone()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
            || self.directories.lock().unwrap().contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.failing_directories.lock().unwrap().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "access denied",
            ));
        }
        self.directories.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        if self.failing_copies.lock().unwrap().contains(to) {
            return Err(io::Error::other("network name no longer available"));
        }
        let contents = self
            .read(from)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "source missing"))?;
        let len = contents.len() as u64;
        self.add_file(to, &contents);
        self.copies
            .lock()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(len)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// Fetcher that writes a fixed body into a `MemoryFileSystem`
pub struct RecordingFetcher {
    fs: Arc<MemoryFileSystem>,
    body: Vec<u8>,
    fail: bool,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingFetcher {
    pub fn new(fs: Arc<MemoryFileSystem>, body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            fs,
            body: body.to_vec(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(fs: Arc<MemoryFileSystem>) -> Arc<Self> {
        Arc::new(Self {
            fs,
            body: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));
        if self.fail {
            return Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            });
        }
        self.fs.add_file(dest, &self.body);
        Ok(self.body.len() as u64)
    }
}

/// Catalog with entries in the given order; `None` marks an unavailable CU
pub fn create_test_catalog(entries: &[(&str, Option<&str>)]) -> Arc<VersionCatalog> {
    let entries = entries.iter().map(|(key, url)| {
        let locator = match url {
            Some(url) => Locator::Available(url.to_string()),
            None => Locator::Unavailable,
        };
        CatalogEntry::new(*key, locator)
    });
    Arc::new(VersionCatalog::new(entries).unwrap())
}
