//! JSON-backed package record and progress stores
//!
//! Both stores are plain JSON objects keyed by package identifier:
//!
//! ```text
//! packages.json: { "<id>": { "old-ver": "1.0", "new-ver": "1.1", "app_name": "Example" } }
//! progress.json: { "<id>": "checked" }
//! ```
//!
//! A missing file loads as an empty store. Saving always rewrites the whole
//! file through a sibling temporary file.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::version::error::StoreError;

/// Last known versions of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    #[serde(rename = "old-ver")]
    pub previous_version: String,
    #[serde(rename = "new-ver")]
    pub current_version: String,
    #[serde(rename = "app_name", default)]
    pub display_name: String,
}

impl PackageRecord {
    /// A record seen for the first time has no previous version to differ from
    pub fn first_seen(display_name: &str, version: &str) -> Self {
        Self {
            previous_version: version.to_string(),
            current_version: version.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Progress marker value; an absent key means unchecked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Progress {
    Checked,
}

pub type RecordStore = IndexMap<String, PackageRecord>;
pub type ProgressStore = IndexMap<String, Progress>;

pub fn load_records(path: &Path) -> Result<RecordStore, StoreError> {
    load_json(path)
}

pub fn save_records(path: &Path, records: &RecordStore) -> Result<(), StoreError> {
    save_json(path, records)
}

pub fn load_progress(path: &Path) -> Result<ProgressStore, StoreError> {
    load_json(path)
}

pub fn save_progress(path: &Path, progress: &ProgressStore) -> Result<(), StoreError> {
    save_json(path, progress)
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{:?} does not exist, starting empty", path);
            return Ok(T::default());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| StoreError::json(path, e))?;
    buf.push(b'\n');

    write_replacing(path, &buf)
}

/// Writes `content` next to `path` first, then renames it over `path`.
pub(crate) fn write_replacing(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, content).map_err(|e| StoreError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
