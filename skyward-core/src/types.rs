//! Domain types shared by the sync engine and the remote client.
//!
//! Everything that crosses the wire is serde-(de)serializable with
//! `snake_case` field names, matching the admin API payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Server-assigned identifier of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(pub String);

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DraftId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DraftId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Server-assigned identifier of a deployment job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(pub String);

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DeploymentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeploymentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Remote coordinates of the application being synchronized.
///
/// An empty `app_id` means the application does not exist remotely yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    pub group_id: String,
    pub app_id: String,
    /// Human-facing app id (`myapp-abcde`); empty until known.
    #[serde(default)]
    pub client_app_id: String,
}

impl AppIdentity {
    pub fn new(group_id: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            app_id: app_id.into(),
            client_app_id: String::new(),
        }
    }

    /// `true` when no remote application has been created yet.
    pub fn is_new(&self) -> bool {
        self.app_id.is_empty()
    }

    /// Label used in user-facing output: client app id when known.
    pub fn display_id(&self) -> &str {
        if self.client_app_id.is_empty() {
            &self.app_id
        } else {
            &self.client_app_id
        }
    }
}

impl From<&App> for AppIdentity {
    fn from(app: &App) -> Self {
        Self {
            group_id: app.group_id.clone(),
            app_id: app.id.clone(),
            client_app_id: app.client_app_id.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Hosting region of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Location {
    #[default]
    #[serde(rename = "US-VA")]
    Virginia,
    #[serde(rename = "US-OR")]
    Oregon,
    #[serde(rename = "DE-FF")]
    Frankfurt,
    #[serde(rename = "IE")]
    Ireland,
    #[serde(rename = "AU")]
    Sydney,
    #[serde(rename = "IN-MB")]
    Mumbai,
    #[serde(rename = "SG")]
    Singapore,
}

impl Location {
    pub const ALL: [Location; 7] = [
        Location::Virginia,
        Location::Oregon,
        Location::Frankfurt,
        Location::Ireland,
        Location::Sydney,
        Location::Mumbai,
        Location::Singapore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Virginia => "US-VA",
            Location::Oregon => "US-OR",
            Location::Frankfurt => "DE-FF",
            Location::Ireland => "IE",
            Location::Sydney => "AU",
            Location::Mumbai => "IN-MB",
            Location::Singapore => "SG",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Location::ALL.iter().map(|l| l.as_str()).collect();
                format!("unknown location '{s}'; expected one of: {}", known.join(", "))
            })
    }
}

/// Whether the application is served globally or pinned to its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeploymentModel {
    #[default]
    Global,
    Local,
}

impl DeploymentModel {
    pub const ALL: [DeploymentModel; 2] = [DeploymentModel::Global, DeploymentModel::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentModel::Global => "GLOBAL",
            DeploymentModel::Local => "LOCAL",
        }
    }
}

impl fmt::Display for DeploymentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GLOBAL" => Ok(DeploymentModel::Global),
            "LOCAL" => Ok(DeploymentModel::Local),
            other => Err(format!(
                "unknown deployment model '{other}'; expected: GLOBAL, LOCAL"
            )),
        }
    }
}

/// Server-driven status of a deployment job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Created,
    Pending,
    Successful,
    Failed,
}

impl DeploymentStatus {
    /// `Created` and `Pending` are in flight; the rest are terminal.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, DeploymentStatus::Created | DeploymentStatus::Pending)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Created => write!(f, "created"),
            DeploymentStatus::Pending => write!(f, "pending"),
            DeploymentStatus::Successful => write!(f, "successful"),
            DeploymentStatus::Failed => write!(f, "failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote records
// ---------------------------------------------------------------------------

/// An application as reported by the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(rename = "_id")]
    pub id: String,
    pub client_app_id: String,
    pub name: String,
    pub group_id: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub deployment_model: DeploymentModel,
}

/// Creation metadata sent alongside a new app's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMeta {
    pub location: Location,
    pub deployment_model: DeploymentModel,
}

/// The single staging area of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(rename = "_id")]
    pub id: DraftId,
}

/// A deployment job created from a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(rename = "_id")]
    pub id: DeploymentId,
    pub status: DeploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_error_message: Option<String>,
}

/// One entry of the remote hosting asset manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingAsset {
    pub path: String,
    #[serde(rename = "hash")]
    pub file_hash: String,
    #[serde(rename = "size", default)]
    pub file_size: u64,
    #[serde(default)]
    pub last_modified: i64,
}

// ---------------------------------------------------------------------------
// Draft diff
// ---------------------------------------------------------------------------

/// Everything an existing draft would change, split by concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftDiff {
    #[serde(default)]
    pub diffs: Vec<String>,
    #[serde(default)]
    pub hosting_files_diff: HostingFilesDiff,
    #[serde(default)]
    pub dependencies_diff: DependenciesDiff,
    #[serde(default)]
    pub graphql_config_diff: GraphQlConfigDiff,
    #[serde(default)]
    pub schema_options_diff: SchemaOptionsDiff,
}

impl DraftDiff {
    pub fn has_changes(&self) -> bool {
        !self.diffs.is_empty()
            || self.hosting_files_diff.has_changes()
            || self.dependencies_diff.has_changes()
            || self.graphql_config_diff.has_changes()
            || self.schema_options_diff.has_changes()
    }

    pub fn diff_list(&self) -> Vec<String> {
        self.diffs.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingFilesDiff {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl HostingFilesDiff {
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty())
    }

    pub fn diff_list(&self) -> Vec<String> {
        let mut list = Vec::new();
        list.extend(self.added.iter().map(|p| format!("+ {p}")));
        list.extend(self.deleted.iter().map(|p| format!("- {p}")));
        list.extend(self.modified.iter().map(|p| format!("* {p}")));
        list
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyData {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDiffData {
    pub name: String,
    pub version: String,
    pub previous_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependenciesDiff {
    #[serde(default)]
    pub added: Vec<DependencyData>,
    #[serde(default)]
    pub deleted: Vec<DependencyData>,
    #[serde(default)]
    pub modified: Vec<DependencyDiffData>,
}

impl DependenciesDiff {
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty())
    }

    pub fn diff_list(&self) -> Vec<String> {
        let mut list = Vec::new();
        list.extend(
            self.added
                .iter()
                .map(|d| format!("+ {}@{}", d.name, d.version)),
        );
        list.extend(
            self.deleted
                .iter()
                .map(|d| format!("- {}@{}", d.name, d.version)),
        );
        list.extend(self.modified.iter().map(|d| {
            format!("* {}@{} -> {}@{}", d.name, d.previous_version, d.name, d.version)
        }));
        list
    }
}

/// A single changed field, rendered as `field: previous -> updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field_name: String,
    #[serde(default)]
    pub previous_value: serde_json::Value,
    #[serde(default)]
    pub updated_value: serde_json::Value,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.field_name, self.previous_value, self.updated_value
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlConfigDiff {
    #[serde(default)]
    pub field_diffs: Vec<FieldDiff>,
}

impl GraphQlConfigDiff {
    pub fn has_changes(&self) -> bool {
        !self.field_diffs.is_empty()
    }

    pub fn diff_list(&self) -> Vec<String> {
        self.field_diffs.iter().map(|d| d.to_string()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptionsDiff {
    #[serde(default)]
    pub graphql_validation_diffs: Vec<FieldDiff>,
    #[serde(default)]
    pub rest_validation_diffs: Vec<FieldDiff>,
}

impl SchemaOptionsDiff {
    pub fn has_changes(&self) -> bool {
        !(self.graphql_validation_diffs.is_empty() && self.rest_validation_diffs.is_empty())
    }

    pub fn diff_list(&self) -> Vec<String> {
        let graphql = self
            .graphql_validation_diffs
            .iter()
            .map(|d| format!("GraphQL {d}"));
        let rest = self
            .rest_validation_diffs
            .iter()
            .map(|d| format!("REST {d}"));
        graphql.chain(rest).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(DraftId::from("d-01").to_string(), "d-01");
        assert_eq!(DeploymentId::from("dep-01").to_string(), "dep-01");
    }

    #[test]
    fn identity_is_new_when_app_id_empty() {
        assert!(AppIdentity::new("group", "").is_new());
        assert!(!AppIdentity::new("group", "app").is_new());
    }

    #[test]
    fn identity_display_prefers_client_app_id() {
        let mut identity = AppIdentity::new("group", "60a1");
        assert_eq!(identity.display_id(), "60a1");
        identity.client_app_id = "myapp-abcde".to_string();
        assert_eq!(identity.display_id(), "myapp-abcde");
    }

    #[test]
    fn location_parses_case_insensitively() {
        assert_eq!("us-va".parse::<Location>().unwrap(), Location::Virginia);
        assert_eq!("AU".parse::<Location>().unwrap(), Location::Sydney);
        assert!("mars".parse::<Location>().unwrap_err().contains("US-VA"));
    }

    #[test]
    fn deployment_model_display() {
        assert_eq!(DeploymentModel::Local.to_string(), "LOCAL");
        assert_eq!("global".parse::<DeploymentModel>().unwrap(), DeploymentModel::Global);
    }

    #[test]
    fn in_flight_statuses() {
        assert!(DeploymentStatus::Created.is_in_flight());
        assert!(DeploymentStatus::Pending.is_in_flight());
        assert!(!DeploymentStatus::Successful.is_in_flight());
        assert!(!DeploymentStatus::Failed.is_in_flight());
    }

    #[test]
    fn deployment_parses_from_wire_json() {
        let deployment: Deployment =
            serde_json::from_str(r#"{"_id":"dep-1","status":"pending"}"#).expect("parse");
        assert_eq!(deployment.id, DeploymentId::from("dep-1"));
        assert_eq!(deployment.status, DeploymentStatus::Pending);
        assert!(deployment.status_error_message.is_none());
    }

    #[test]
    fn empty_draft_diff_has_no_changes() {
        let diff: DraftDiff = serde_json::from_str("{}").expect("parse");
        assert!(!diff.has_changes());
    }

    #[test]
    fn draft_sub_diffs_report_independently() {
        let diff = DraftDiff {
            hosting_files_diff: HostingFilesDiff {
                added: vec!["/index.html".to_string()],
                ..Default::default()
            },
            dependencies_diff: DependenciesDiff {
                modified: vec![DependencyDiffData {
                    name: "lodash".to_string(),
                    version: "4.17.21".to_string(),
                    previous_version: "4.17.20".to_string(),
                }],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(diff.has_changes());
        assert!(diff.diff_list().is_empty());
        assert_eq!(diff.hosting_files_diff.diff_list(), vec!["+ /index.html"]);
        assert_eq!(
            diff.dependencies_diff.diff_list(),
            vec!["* lodash@4.17.20 -> lodash@4.17.21"]
        );
        assert!(!diff.graphql_config_diff.has_changes());
        assert!(!diff.schema_options_diff.has_changes());
    }

    #[test]
    fn field_diff_renders_json_values() {
        let diff = FieldDiff {
            field_name: "use_natural_pluralization".to_string(),
            previous_value: serde_json::json!(true),
            updated_value: serde_json::json!(false),
        };
        assert_eq!(diff.to_string(), "use_natural_pluralization: true -> false");
    }
}
