//! Local application directory.
//!
//! # Layout
//!
//! ```text
//! <app>/
//!   realm_config.json | config.json | stitch.json   (exactly one, probed in that order)
//!   hosting/files/...                                (static hosting assets)
//!   functions/node_modules.{zip,tar,tgz,tar.gz}      (dependency archive)
//! ```
//!
//! The config document is kept as opaque JSON. Only the identity fields are
//! interpreted, through [`AppMetadataProvider`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;

use crate::error::{io_err, LocalError};
use crate::types::{App, DeploymentModel, Location};

/// Config file schema generation, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigVersion {
    V20210101,
    V20200603,
    V20180301,
}

impl ConfigVersion {
    pub const ALL: [ConfigVersion; 3] = [
        ConfigVersion::V20210101,
        ConfigVersion::V20200603,
        ConfigVersion::V20180301,
    ];

    /// File name carrying this version's config.
    pub fn file_name(&self) -> &'static str {
        match self {
            ConfigVersion::V20210101 => "realm_config.json",
            ConfigVersion::V20200603 => "config.json",
            ConfigVersion::V20180301 => "stitch.json",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            ConfigVersion::V20210101 => 20210101,
            ConfigVersion::V20200603 => 20200603,
            ConfigVersion::V20180301 => 20180301,
        }
    }

    /// Only the newest schema records location and deployment model.
    fn carries_placement(&self) -> bool {
        matches!(self, ConfigVersion::V20210101)
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Identity fields an app definition may or may not carry.
///
/// Placement fields distinguish "absent" (`Ok(None)`) from "set to something
/// unrecognised" (`Err(LocalError::InvalidField)`).
pub trait AppMetadataProvider {
    fn name(&self) -> Option<&str>;
    fn location(&self) -> Result<Option<Location>, LocalError>;
    fn deployment_model(&self) -> Result<Option<DeploymentModel>, LocalError>;
}

/// A versioned application definition read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    pub config_version: ConfigVersion,
    pub document: Value,
}

impl AppData {
    pub fn new(config_version: ConfigVersion, document: Value) -> Self {
        Self {
            config_version,
            document,
        }
    }

    /// Client app id recorded in the config, if any.
    pub fn client_app_id(&self) -> Option<&str> {
        non_empty_str(&self.document, "app_id")
    }

    /// The serialized form sent to the remote for diff and import.
    pub fn payload(&self) -> Value {
        let mut payload = self.document.clone();
        if let Value::Object(map) = &mut payload {
            map.entry("config_version")
                .or_insert_with(|| Value::from(self.config_version.as_u32()));
        }
        payload
    }
}

impl AppMetadataProvider for AppData {
    fn name(&self) -> Option<&str> {
        non_empty_str(&self.document, "name")
    }

    fn location(&self) -> Result<Option<Location>, LocalError> {
        self.placement("location")
    }

    fn deployment_model(&self) -> Result<Option<DeploymentModel>, LocalError> {
        self.placement("deployment_model")
    }
}

impl AppData {
    /// Missing, `null` and `""` read as absent; anything else must parse.
    fn placement<T>(&self, key: &str) -> Result<Option<T>, LocalError>
    where
        T: FromStr<Err = String>,
    {
        if !self.config_version.carries_placement() {
            return Ok(None);
        }
        let invalid = |value: String, reason: String| LocalError::InvalidField {
            key: key.to_string(),
            value,
            reason,
        };
        match self.document.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => s.parse().map(Some).map_err(|e| invalid(s.clone(), e)),
            Some(other) => Err(invalid(other.to_string(), "expected a string".to_string())),
        }
    }
}

/// An app directory loaded from disk.
#[derive(Debug, Clone)]
pub struct LocalApp {
    pub root_dir: PathBuf,
    pub config_path: PathBuf,
    pub data: AppData,
}

impl LocalApp {
    /// Load the app config found in `dir`.
    ///
    /// Returns `LocalError::AppNotFound` when no known config file exists and
    /// `LocalError::Parse` (with path) when the file is not valid JSON.
    pub fn load(dir: &Path) -> Result<Self, LocalError> {
        for version in ConfigVersion::ALL {
            let path = dir.join(version.file_name());
            if !path.exists() {
                continue;
            }
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let document: Value =
                serde_json::from_str(&contents).map_err(|e| LocalError::Parse {
                    path: path.clone(),
                    source: e,
                })?;
            return Ok(Self {
                root_dir: dir.to_path_buf(),
                config_path: path,
                data: AppData::new(version, document),
            });
        }
        Err(LocalError::AppNotFound {
            dir: dir.to_path_buf(),
        })
    }

    /// `<app>/hosting/files`
    pub fn hosting_files_dir(&self) -> PathBuf {
        self.root_dir.join("hosting").join("files")
    }

    /// `<app>/functions`
    pub fn functions_dir(&self) -> PathBuf {
        self.root_dir.join("functions")
    }

    /// Locate the packaged dependency archive under `functions/`.
    pub fn dependencies_archive(&self) -> Result<PathBuf, LocalError> {
        let dir = self.functions_dir();
        let found = [
            "node_modules.zip",
            "node_modules.tar",
            "node_modules.tgz",
            "node_modules.tar.gz",
        ]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file());
        found.ok_or(LocalError::DependenciesNotFound { dir })
    }

    /// Record a freshly created remote app in the local config.
    ///
    /// Write flow: serialize → `<file>.tmp` sibling → `rename`.
    pub fn write_identity(&mut self, app: &App) -> Result<(), LocalError> {
        if !self.data.document.is_object() {
            self.data.document = Value::Object(Default::default());
        }
        if let Value::Object(map) = &mut self.data.document {
            map.insert("app_id".to_string(), Value::from(app.client_app_id.clone()));
            map.insert("name".to_string(), Value::from(app.name.clone()));
            if self.data.config_version.carries_placement() {
                map.insert("location".to_string(), Value::from(app.location.as_str()));
                map.insert(
                    "deployment_model".to_string(),
                    Value::from(app.deployment_model.as_str()),
                );
            }
        }

        let json = serde_json::to_string_pretty(&self.data.document)?;
        let tmp = self.config_path.with_extension("json.tmp");
        std::fs::write(&tmp, format!("{json}\n")).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.config_path).map_err(|e| io_err(&self.config_path, e))?;
        Ok(())
    }
}

fn non_empty_str<'a>(document: &'a Value, key: &str) -> Option<&'a str> {
    document
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, file: &str, doc: Value) {
        std::fs::write(dir.path().join(file), doc.to_string()).expect("write config");
    }

    #[test]
    fn load_missing_config_returns_not_found() {
        let dir = TempDir::new().unwrap();
        let err = LocalApp::load(dir.path()).unwrap_err();
        assert!(matches!(err, LocalError::AppNotFound { .. }));
    }

    #[test]
    fn malformed_json_reports_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("realm_config.json"), "{ nope").unwrap();
        match LocalApp::load(dir.path()).unwrap_err() {
            LocalError::Parse { path, .. } => assert!(path.ends_with("realm_config.json")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn newest_config_wins_when_several_exist() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "stitch.json", json!({"name": "legacy"}));
        write_config(&dir, "realm_config.json", json!({"name": "current"}));
        let app = LocalApp::load(dir.path()).unwrap();
        assert_eq!(app.data.config_version, ConfigVersion::V20210101);
        assert_eq!(app.data.name(), Some("current"));
    }

    #[test]
    fn empty_fields_read_as_absent() {
        let data = AppData::new(
            ConfigVersion::V20210101,
            json!({"name": "", "location": "", "app_id": ""}),
        );
        assert_eq!(data.name(), None);
        assert_eq!(data.location().unwrap(), None);
        assert_eq!(data.client_app_id(), None);
    }

    #[test]
    fn payload_carries_config_version() {
        let data = AppData::new(ConfigVersion::V20200603, json!({"name": "app"}));
        assert_eq!(data.payload()["config_version"], json!(20200603));
        assert_eq!(data.payload()["name"], json!("app"));
    }

    #[test]
    fn write_identity_updates_config_atomically() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "realm_config.json", json!({"config_version": 20210101}));
        let mut local = LocalApp::load(dir.path()).unwrap();
        let app = App {
            id: "60a1".to_string(),
            client_app_id: "myapp-abcde".to_string(),
            name: "myapp".to_string(),
            group_id: "group".to_string(),
            location: Location::Ireland,
            deployment_model: DeploymentModel::Local,
        };
        local.write_identity(&app).expect("write identity");

        let reloaded = LocalApp::load(dir.path()).unwrap();
        assert_eq!(reloaded.data.client_app_id(), Some("myapp-abcde"));
        assert_eq!(reloaded.data.location().unwrap(), Some(Location::Ireland));
        assert_eq!(
            reloaded.data.deployment_model().unwrap(),
            Some(DeploymentModel::Local)
        );
        assert!(!dir.path().join("realm_config.json.tmp").exists());
    }

    #[test]
    fn write_identity_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("realm_config.json"),
            r#"{"name": "myapp", "config_version": 20210101, "app_id": ""}"#,
        )
        .unwrap();
        let mut local = LocalApp::load(dir.path()).unwrap();
        let app = App {
            id: "60a1".to_string(),
            client_app_id: "myapp-abcde".to_string(),
            name: "myapp".to_string(),
            group_id: "group".to_string(),
            location: Location::Virginia,
            deployment_model: DeploymentModel::Global,
        };
        local.write_identity(&app).expect("write identity");

        let written = std::fs::read_to_string(dir.path().join("realm_config.json")).unwrap();
        let position = |key: &str| written.find(&format!("\"{key}\"")).unwrap();
        assert!(position("name") < position("config_version"));
        assert!(position("config_version") < position("app_id"));
        assert!(position("app_id") < position("location"));
    }

    #[test]
    fn unrecognised_placement_is_an_error() {
        let data = AppData::new(
            ConfigVersion::V20210101,
            json!({"location": "US-OH", "deployment_model": "LOCAL"}),
        );
        match data.location().unwrap_err() {
            LocalError::InvalidField { key, value, .. } => {
                assert_eq!(key, "location");
                assert_eq!(value, "US-OH");
            }
            other => panic!("expected invalid field, got {other:?}"),
        }
        assert_eq!(data.deployment_model().unwrap(), Some(DeploymentModel::Local));
    }

    #[test]
    fn dependencies_archive_found_in_functions_dir() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "realm_config.json", json!({}));
        let local = LocalApp::load(dir.path()).unwrap();
        assert!(matches!(
            local.dependencies_archive().unwrap_err(),
            LocalError::DependenciesNotFound { .. }
        ));

        std::fs::create_dir_all(dir.path().join("functions")).unwrap();
        std::fs::write(dir.path().join("functions/node_modules.tgz"), b"archive").unwrap();
        let path = local.dependencies_archive().expect("archive");
        assert!(path.ends_with("functions/node_modules.tgz"));
    }
}
