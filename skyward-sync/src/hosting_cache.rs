//! Hosting asset cache — content hashes of local hosting files.
//!
//! Persists a `HostingCacheFile` JSON document at the fixed cache path
//! (`~/.skyward/hosting/assets.json`), keyed by remote app id and then by
//! asset path. Size and mtime are stored alongside each hash so unchanged
//! files are not re-hashed on the next run.
//! Writes use an atomic `.tmp` + rename.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

/// Last known state of one local asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedAsset {
    pub hash: String,
    pub size: u64,
    /// Modification time in milliseconds since the Unix epoch.
    pub modified_ms: i64,
}

/// Asset path → cached entry, for one app.
pub type AppAssetCache = HashMap<String, CachedAsset>;

/// On-disk cache payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostingCacheFile {
    pub synced_at: DateTime<Utc>,
    #[serde(default)]
    pub apps: HashMap<String, AppAssetCache>,
}

impl Default for HostingCacheFile {
    fn default() -> Self {
        Self {
            synced_at: Utc::now(),
            apps: HashMap::new(),
        }
    }
}

impl HostingCacheFile {
    pub fn app(&self, app_id: &str) -> Option<&AppAssetCache> {
        self.apps.get(app_id)
    }
}

/// Load the cache at `path`.
///
/// Returns an empty cache if the file does not yet exist.
pub fn load(path: &Path) -> Result<HostingCacheFile, SyncError> {
    if !path.exists() {
        return Ok(HostingCacheFile::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the cache atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save(path: &Path, cache: &HostingCacheFile) -> Result<(), SyncError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid hosting cache path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(cache)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}
