//! User profile and well-known paths.
//!
//! # Storage layout
//!
//! ```text
//! ~/.skyward/
//!   profile.yaml          (read-only here; written by the user)
//!   hosting/assets.json   (hosting asset hash cache)
//! ```
//!
//! Path helpers take the home directory explicitly (`fn_at(home, …)`) so tests
//! can point them at a `TempDir`; [`home`] resolves the real one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, LocalError};

pub const DEFAULT_BASE_URL: &str = "https://services.cloud.mongodb.com";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub const ENV_BASE_URL: &str = "SKYWARD_BASE_URL";
pub const ENV_ACCESS_TOKEN: &str = "SKYWARD_ACCESS_TOKEN";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.skyward`
pub fn skyward_root(home: &Path) -> PathBuf {
    home.join(".skyward")
}

/// `<home>/.skyward/profile.yaml`
pub fn profile_path_at(home: &Path) -> PathBuf {
    skyward_root(home).join("profile.yaml")
}

/// `<home>/.skyward/hosting/assets.json`
pub fn hosting_cache_path_at(home: &Path) -> PathBuf {
    skyward_root(home).join("hosting").join("assets.json")
}

// ---------------------------------------------------------------------------
// 2. Profile
// ---------------------------------------------------------------------------

/// Settings persisted between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            default_group_id: None,
            poll_interval_ms: None,
        }
    }
}

impl Profile {
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Apply `SKYWARD_BASE_URL` / `SKYWARD_ACCESS_TOKEN` on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            if !token.is_empty() {
                self.access_token = Some(token);
            }
        }
        self
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Load `<home>/.skyward/profile.yaml`, or the default profile when absent.
pub fn load_at(home: &Path) -> Result<Profile, LocalError> {
    let path = profile_path_at(home);
    if !path.exists() {
        return Ok(Profile::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| LocalError::Profile { path, source: e })
}

/// The current user's home directory.
pub fn home() -> Result<PathBuf, LocalError> {
    dirs::home_dir().ok_or(LocalError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
