//! Static hosting reconciliation.
//!
//! Three steps, kept separate so the comparison stays pure:
//!
//! 1. [`scan`] walks `<app>/hosting/files`, reusing cached hashes for files
//!    whose size and mtime are unchanged.
//! 2. [`reconcile`] compares the local manifest with the remote one.
//! 3. [`upload_assets`] pushes the diff, one asset at a time; a failing asset
//!    is reported and skipped. [`record_upload`] then folds the outcome back
//!    into the cache.
//!
//! Directionality:
//! - local only → **added**
//! - both, hash differs → **modified**
//! - remote only → **removed**

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::Utc;
use sha2::{Digest, Sha256};

use skyward_core::{AppIdentity, HostingAsset, HostingAssetUpload, RemoteClient};

use crate::error::{io_err, Stage, SyncError};
use crate::hosting_cache::{AppAssetCache, CachedAsset, HostingCacheFile};

/// Hash and size of one asset, on either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub hash: String,
    pub size: u64,
}

impl AssetEntry {
    pub fn new(hash: impl Into<String>, size: u64) -> Self {
        Self {
            hash: hash.into(),
            size,
        }
    }
}

/// Asset path → entry, sorted by path.
pub type AssetManifest = BTreeMap<String, AssetEntry>;

/// Remote manifest keyed by path.
pub fn remote_manifest(assets: &[HostingAsset]) -> AssetManifest {
    assets
        .iter()
        .map(|a| (a.path.clone(), AssetEntry::new(a.file_hash.clone(), a.file_size)))
        .collect()
}

// ---------------------------------------------------------------------------
// Local scan
// ---------------------------------------------------------------------------

/// A hosting file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub file: PathBuf,
    pub hash: String,
    pub size: u64,
    pub modified_ms: i64,
}

/// Every hosting file under a root, keyed by `/`-prefixed asset path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalAssets {
    pub root: PathBuf,
    pub assets: BTreeMap<String, LocalAsset>,
}

impl LocalAssets {
    pub fn manifest(&self) -> AssetManifest {
        self.assets
            .iter()
            .map(|(path, a)| (path.clone(), AssetEntry::new(a.hash.clone(), a.size)))
            .collect()
    }
}

/// Walk `root` and hash every file, reusing `cached` hashes when size and
/// mtime still match. A missing root yields no assets.
pub fn scan(root: &Path, cached: Option<&AppAssetCache>) -> Result<LocalAssets, SyncError> {
    let mut local = LocalAssets {
        root: root.to_path_buf(),
        assets: BTreeMap::new(),
    };
    if !root.is_dir() {
        return Ok(local);
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;

    for file in files {
        let meta = std::fs::metadata(&file).map_err(|e| io_err(&file, e))?;
        let size = meta.len();
        let modified_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        let path = asset_path(root, &file);

        let reuse = cached
            .and_then(|c| c.get(&path))
            .filter(|c| c.size == size && c.modified_ms == modified_ms)
            .map(|c| c.hash.clone());
        let hash = match reuse {
            Some(hash) => hash,
            None => {
                tracing::debug!("hashing {}", file.display());
                hash_file(&file)?
            }
        };

        local.assets.insert(
            path,
            LocalAsset {
                file,
                hash,
                size,
                modified_ms,
            },
        );
    }
    Ok(local)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SyncError> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// `/`-prefixed, `/`-separated path of `file` relative to `root`.
fn asset_path(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

fn hash_file(path: &Path) -> Result<String, SyncError> {
    let content = std::fs::read(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// One asset to upload or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChange {
    pub path: String,
    pub hash: String,
    pub size: u64,
}

impl AssetChange {
    fn from_entry(path: &str, entry: &AssetEntry) -> Self {
        Self {
            path: path.to_string(),
            hash: entry.hash.clone(),
            size: entry.size,
        }
    }
}

/// Classified difference between local and remote hosting assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostingDiff {
    pub added: Vec<AssetChange>,
    pub modified: Vec<AssetChange>,
    pub removed: Vec<AssetChange>,
}

impl HostingDiff {
    pub fn size(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Rendered change lines, grouped by kind. Empty when there is nothing to do.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.size() + 3);
        if !self.added.is_empty() {
            lines.push("New hosting files".to_string());
            lines.extend(self.added.iter().map(|a| format!("  + {}", a.path)));
        }
        if !self.removed.is_empty() {
            lines.push("Removed hosting files".to_string());
            lines.extend(self.removed.iter().map(|a| format!("  - {}", a.path)));
        }
        if !self.modified.is_empty() {
            lines.push("Modified hosting files".to_string());
            lines.extend(self.modified.iter().map(|a| format!("  * {}", a.path)));
        }
        lines
    }
}

/// Compare a local manifest against the remote one. Pure.
pub fn reconcile(local: &AssetManifest, remote: &AssetManifest) -> HostingDiff {
    let mut diff = HostingDiff::default();
    for (path, entry) in local {
        match remote.get(path) {
            None => diff.added.push(AssetChange::from_entry(path, entry)),
            Some(theirs) if theirs.hash != entry.hash => {
                diff.modified.push(AssetChange::from_entry(path, entry))
            }
            Some(_) => {}
        }
    }
    for (path, entry) in remote {
        if !local.contains_key(path) {
            diff.removed.push(AssetChange::from_entry(path, entry));
        }
    }
    diff
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// What happened to each asset of a [`HostingDiff`] during upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

/// Upload added and modified assets, delete removed ones.
///
/// Each failing asset is passed to `on_asset_error` and recorded in
/// [`UploadReport::failed`]; the remaining assets are still processed.
pub fn upload_assets(
    remote: &dyn RemoteClient,
    identity: &AppIdentity,
    local: &LocalAssets,
    diff: &HostingDiff,
    on_asset_error: &mut dyn FnMut(SyncError),
) -> UploadReport {
    let mut report = UploadReport::default();

    for change in diff.added.iter().chain(diff.modified.iter()) {
        match upload_one(remote, identity, local, change) {
            Ok(()) => {
                tracing::debug!("uploaded hosting asset {}", change.path);
                report.uploaded.push(change.path.clone());
            }
            Err(err) => {
                tracing::warn!("failed to upload hosting asset {}: {err}", change.path);
                report.failed.push(change.path.clone());
                on_asset_error(err);
            }
        }
    }

    for change in &diff.removed {
        match remote.delete_hosting_asset(identity, &change.path) {
            Ok(()) => {
                tracing::debug!("removed hosting asset {}", change.path);
                report.removed.push(change.path.clone());
            }
            Err(err) => {
                tracing::warn!("failed to remove hosting asset {}: {err}", change.path);
                report.failed.push(change.path.clone());
                on_asset_error(SyncError::at(Stage::UploadHosting)(err));
            }
        }
    }

    report
}

fn upload_one(
    remote: &dyn RemoteClient,
    identity: &AppIdentity,
    local: &LocalAssets,
    change: &AssetChange,
) -> Result<(), SyncError> {
    let file = local
        .assets
        .get(&change.path)
        .map(|a| a.file.clone())
        .unwrap_or_else(|| local.root.join(change.path.trim_start_matches('/')));
    let body = std::fs::read(&file).map_err(|e| io_err(&file, e))?;
    let upload = HostingAssetUpload {
        path: change.path.clone(),
        file_hash: change.hash.clone(),
        file_size: change.size,
        body,
    };
    remote
        .upload_hosting_asset(identity, &upload)
        .map_err(SyncError::at(Stage::UploadHosting))
}

/// Fold an upload pass into the cache for `app_id`.
///
/// Every local asset that did not fail is recorded with its current hash;
/// entries for assets no longer present locally are dropped unless their
/// remote removal failed. Failed assets keep their previous entry.
pub fn record_upload(
    cache: &mut HostingCacheFile,
    app_id: &str,
    local: &LocalAssets,
    report: &UploadReport,
) {
    let failed: BTreeSet<&str> = report.failed.iter().map(String::as_str).collect();
    let entries = cache.apps.entry(app_id.to_string()).or_default();

    for (path, asset) in &local.assets {
        if failed.contains(path.as_str()) {
            continue;
        }
        entries.insert(
            path.clone(),
            CachedAsset {
                hash: asset.hash.clone(),
                size: asset.size,
                modified_ms: asset.modified_ms,
            },
        );
    }
    entries.retain(|path, _| local.assets.contains_key(path) || failed.contains(path.as_str()));
    cache.synced_at = Utc::now();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
