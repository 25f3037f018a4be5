use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Default catalog page prefix; the identifier is appended as the last path segment
pub const DEFAULT_BASE_URL: &str = "https://apkcombo.app/1";

/// Timeout for a single fetch attempt in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Total attempts made for a page before giving up on timeouts
pub const FETCH_MAX_ATTEMPTS: u32 = 3;

/// Delay between two attempts after a timeout (2 seconds)
pub const RETRY_DELAY_MS: u64 = 2_000;

/// Maximum number of packages in flight at once
pub const MAX_CONCURRENT_FETCHES: usize = 10;

const DEFAULT_USER_AGENT: &str = "version-watch";

// =============================================================================
// File-related constants
// =============================================================================

pub const DEFAULT_PACKAGES_LIST_FILE: &str = "packages_list.txt";
pub const DEFAULT_RECORDS_FILE: &str = "packages.json";
pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";
pub const DEFAULT_REPORT_FILE: &str = "updated_packages.html";

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchConfig {
    pub fetch: FetchConfig,
    pub files: FilesConfig,
    pub selectors: SelectorConfig,
    pub report: ReportConfig,
}

impl WatchConfig {
    /// Reads a JSON configuration file. Missing fields use their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Network-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    pub base_url: String,
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    pub max_attempts: u32,
    /// Delay between timed-out attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Admission gate capacity, also used as the connection pool size
    pub concurrency: usize,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: FETCH_TIMEOUT_MS,
            max_attempts: FETCH_MAX_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
            concurrency: MAX_CONCURRENT_FETCHES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Locations of the identifier list, the stores, and the report
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FilesConfig {
    pub packages_list: PathBuf,
    pub records: PathBuf,
    pub progress: PathBuf,
    pub report: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            packages_list: PathBuf::from(DEFAULT_PACKAGES_LIST_FILE),
            records: PathBuf::from(DEFAULT_RECORDS_FILE),
            progress: PathBuf::from(DEFAULT_PROGRESS_FILE),
            report: PathBuf::from(DEFAULT_REPORT_FILE),
        }
    }
}

/// CSS selectors used to pull fields out of a catalog page
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectorConfig {
    /// Link inside the display-name element
    pub display_name: String,
    pub version: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            display_name: "div.app_name a".to_string(),
            version: "div.version".to_string(),
        }
    }
}

/// Presentation of the HTML report
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub title: String,
    /// Value of the `lang` attribute
    pub lang: String,
    /// Text direction, `ltr` or `rtl`
    pub direction: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Updated packages".to_string(),
            lang: "en".to_string(),
            direction: "ltr".to_string(),
        }
    }
}

/// Returns the path to the log file inside the data directory.
/// The data directory is $XDG_DATA_HOME/version-watch if XDG_DATA_HOME is set,
/// otherwise ~/.local/share/version-watch, or ./version-watch if neither is available.
pub fn log_path() -> PathBuf {
    log_path_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

fn log_path_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    data_dir_with_env(xdg_data_home, home_dir).join("version-watch.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("version-watch")
}
