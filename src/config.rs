use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::distribution::{RemoteRoot, WorkflowConfig};

// =============================================================================
// Constants
// =============================================================================

/// Directory under each target's root share that receives the installer
pub const DEFAULT_DESTINATION_DIRECTORY: &str = r"C$\Source";

/// Timeout for establishing a download connection in seconds
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

const APP_NAME: &str = "cu-distributor";

/// Catalog file looked up in the data directory
const CATALOG_FILE_NAME: &str = "catalog.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "UNC target paths need a Windows host; set remoteRoot to \
         {{\"kind\": \"directory\", \"path\": ...}} pointing at the mounted shares"
    )]
    UncRootUnsupported,
}

/// Tool configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DistributorConfig {
    /// Local directory holding the downloaded installer
    pub temp_directory: PathBuf,
    /// Directory relative to each target's root share
    pub destination_directory: String,
    /// Delete the downloaded installer once every target has it
    pub remove_temp: bool,
    /// How target roots are addressed
    pub remote_root: RemoteRoot,
    /// Catalog file; defaults to `<data_dir>/catalog.json`, then the built-in one
    pub catalog_path: Option<PathBuf>,
    /// Server list export used for automatic detection
    pub inventory_path: Option<PathBuf>,
    /// Upper bound for a whole download; unbounded when unset
    pub fetch_timeout_secs: Option<u64>,
    pub log: LogConfig,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            temp_directory: std::env::temp_dir(),
            destination_directory: DEFAULT_DESTINATION_DIRECTORY.to_string(),
            remove_temp: false,
            remote_root: RemoteRoot::default(),
            catalog_path: None,
            inventory_path: None,
            fetch_timeout_secs: None,
            log: LogConfig::default(),
        }
    }
}

impl DistributorConfig {
    /// Catalog file to load
    ///
    /// The configured path wins; otherwise `<data_dir>/catalog.json` if it
    /// exists. None means the built-in catalog.
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path_in(&data_dir())
    }

    fn catalog_path_in(&self, data_dir: &Path) -> Option<PathBuf> {
        self.catalog_path.clone().or_else(|| {
            let path = data_dir.join(CATALOG_FILE_NAME);
            path.exists().then_some(path)
        })
    }

    /// Settings the distribution workflow runs with
    ///
    /// Fails for a UNC root on hosts other than Windows, where `\\host\share`
    /// is not a remote path.
    pub fn workflow(&self) -> Result<WorkflowConfig, ConfigError> {
        if cfg!(not(windows)) && self.remote_root == RemoteRoot::Unc {
            return Err(ConfigError::UncRootUnsupported);
        }

        Ok(WorkflowConfig {
            temp_directory: self.temp_directory.clone(),
            destination_directory: self.destination_directory.clone(),
            remove_temp: self.remove_temp,
            remote_root: self.remote_root.clone(),
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset
    pub level: String,
    /// Also write logs to `<data_dir>/cu-distributor.log`
    pub file: bool,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: false,
            json: false,
        }
    }
}

/// Load configuration
///
/// An explicit path must exist. Without one, the default config file is read
/// if present and defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<DistributorConfig, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = config_path();
            if !default_path.exists() {
                return Ok(DistributorConfig::default());
            }
            default_path
        }
    };

    let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ConfigError::Parse { path, source })
}

/// Returns the path to the data directory for cu-distributor.
/// Uses $XDG_DATA_HOME/cu-distributor if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/cu-distributor,
/// or ./cu-distributor if neither is available.
pub fn data_dir() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the default config file.
/// Uses $XDG_CONFIG_HOME/cu-distributor/config.json, falling back to ~/.config.
pub fn config_path() -> PathBuf {
    dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("cu-distributor.log")
}

fn dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, home_suffix: &str) -> PathBuf {
    let base = xdg_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_suffix)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<DistributorConfig>(json!({
            "removeTemp": true,
            "destinationDirectory": "D$\\Installers"
        }))
        .unwrap();

        assert!(result.remove_temp);
        assert_eq!(result.destination_directory, r"D$\Installers");
        assert_eq!(result.remote_root, RemoteRoot::Unc);
        assert_eq!(result.log, LogConfig::default());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<DistributorConfig>(json!({
            "tempDirectory": "/var/cache/cu",
            "destinationDirectory": "C$\\Source",
            "removeTemp": true,
            "remoteRoot": { "kind": "directory", "path": "/mnt/servers" },
            "catalogPath": "/etc/cu/catalog.json",
            "inventoryPath": "/etc/cu/servers.json",
            "fetchTimeoutSecs": 600,
            "log": { "level": "debug", "file": true, "json": true }
        }))
        .unwrap();

        assert_eq!(
            result,
            DistributorConfig {
                temp_directory: PathBuf::from("/var/cache/cu"),
                destination_directory: r"C$\Source".to_string(),
                remove_temp: true,
                remote_root: RemoteRoot::Directory {
                    path: PathBuf::from("/mnt/servers"),
                },
                catalog_path: Some(PathBuf::from("/etc/cu/catalog.json")),
                inventory_path: Some(PathBuf::from("/etc/cu/servers.json")),
                fetch_timeout_secs: Some(600),
                log: LogConfig {
                    level: "debug".to_string(),
                    file: true,
                    json: true,
                },
            }
        );
    }

    #[test]
    fn workflow_carries_distribution_settings() {
        let root = RemoteRoot::Directory {
            path: PathBuf::from("/mnt/servers"),
        };
        let config = DistributorConfig {
            temp_directory: PathBuf::from("/tmp/cu"),
            remove_temp: true,
            remote_root: root.clone(),
            ..Default::default()
        };

        let workflow = config.workflow().unwrap();

        assert_eq!(workflow.temp_directory, PathBuf::from("/tmp/cu"));
        assert_eq!(workflow.destination_directory, DEFAULT_DESTINATION_DIRECTORY);
        assert!(workflow.remove_temp);
        assert_eq!(workflow.remote_root, root);
    }

    #[cfg(not(windows))]
    #[test]
    fn workflow_rejects_unc_root_off_windows() {
        let result = DistributorConfig::default().workflow();

        assert!(matches!(result, Err(ConfigError::UncRootUnsupported)));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains(r#"{"kind": "directory""#)
        );
    }

    #[cfg(windows)]
    #[test]
    fn workflow_accepts_unc_root_on_windows() {
        let workflow = DistributorConfig::default().workflow().unwrap();

        assert_eq!(workflow.remote_root, RemoteRoot::Unc);
    }

    #[test]
    fn catalog_path_prefers_configured_file() {
        let data = TempDir::new().unwrap();
        std::fs::write(data.path().join(CATALOG_FILE_NAME), "[]").unwrap();
        let config = DistributorConfig {
            catalog_path: Some(PathBuf::from("/etc/cu/catalog.json")),
            ..Default::default()
        };

        assert_eq!(
            config.catalog_path_in(data.path()),
            Some(PathBuf::from("/etc/cu/catalog.json"))
        );
    }

    #[test]
    fn catalog_path_uses_data_dir_file_when_present() {
        let data = TempDir::new().unwrap();
        let file = data.path().join(CATALOG_FILE_NAME);
        std::fs::write(&file, "[]").unwrap();

        assert_eq!(
            DistributorConfig::default().catalog_path_in(data.path()),
            Some(file)
        );
    }

    #[test]
    fn catalog_path_is_none_without_any_file() {
        let data = TempDir::new().unwrap();

        assert_eq!(
            DistributorConfig::default().catalog_path_in(data.path()),
            None
        );
    }

    #[test]
    fn load_config_reads_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"removeTemp": true}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();

        assert!(config.remove_temp);
    }

    #[test]
    fn load_config_fails_for_missing_explicit_file() {
        let result = load_config(Some(Path::new("/nonexistent/config.json")));

        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = load_config(Some(file.path()));

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn dir_with_env_uses_xdg_home_when_set() {
        let path = dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
            ".local/share",
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/cu-distributor"));
    }

    #[test]
    fn dir_with_env_falls_back_to_home_suffix() {
        let path = dir_with_env(None, Some(PathBuf::from("/home/user")), ".config");

        assert_eq!(path, PathBuf::from("/home/user/.config/cu-distributor"));
    }

    #[test]
    fn dir_with_env_ignores_empty_xdg_home() {
        let path = dir_with_env(
            Some(String::new()),
            Some(PathBuf::from("/home/user")),
            ".local/share",
        );

        assert_eq!(path, PathBuf::from("/home/user/.local/share/cu-distributor"));
    }

    #[test]
    fn dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = dir_with_env(None, None, ".local/share");

        assert_eq!(path, PathBuf::from("./cu-distributor"));
    }
}
