//! Resource fetch: download a URL to a local path

use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::CONNECT_TIMEOUT_SECS;
use crate::transfer::part_path;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Blocking-style transfer of a whole resource to a destination path
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dest`, returning the number of bytes written
    ///
    /// `dest` only appears once the transfer has completed.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Fetcher backed by reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher; `timeout` bounds the whole request when set
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("cu-distributor/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn download_to(&self, url: &str, part: &Path) -> Result<u64, FetchError> {
        let io_error = |source| FetchError::Io {
            path: part.to_path_buf(),
            source,
        };

        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Download server returned status {}: {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(part).await.map_err(io_error)?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;

        Ok(written)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let part = part_path(dest);
        debug!("Downloading {} to {:?}", url, part);

        let written = match self.download_to(url, &part).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&part).await
                    && remove_err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to remove partial download {:?}: {}", part, remove_err);
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|source| FetchError::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        info!("Downloaded {} bytes from {} to {:?}", written, url, dest);
        Ok(written)
    }
}
