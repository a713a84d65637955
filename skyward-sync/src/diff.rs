//! Change detection between the local app and the deployed one.

use skyward_core::{AppData, AppIdentity, RemoteClient};

use crate::error::{Stage, SyncError};
use crate::hosting::HostingDiff;
use crate::ui::Log;

/// Advisory line standing in for a dependency diff.
pub const DEPENDENCIES_ADVISORY: &str = "+ New function dependencies";

/// Ordered change lines, partitioned by origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// App structure lines as reported by the remote.
    pub app: Vec<String>,
    pub dependencies: Option<String>,
    pub hosting: Vec<String>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.app.is_empty() && self.dependencies.is_none() && self.hosting.is_empty()
    }

    /// App lines, then the dependency advisory, then hosting lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.app.len() + 1 + self.hosting.len());
        lines.extend(self.app.iter().cloned());
        lines.extend(self.dependencies.iter().cloned());
        lines.extend(self.hosting.iter().cloned());
        lines
    }
}

/// Ask the remote for the app diff and merge in the optional parts.
pub fn compute(
    remote: &dyn RemoteClient,
    identity: &AppIdentity,
    data: &AppData,
    include_dependencies: bool,
    hosting: Option<&HostingDiff>,
) -> Result<DiffResult, SyncError> {
    let app = remote
        .diff(identity, data)
        .map_err(SyncError::at(Stage::Diff))?;
    tracing::debug!("app diff for {}: {} line(s)", identity.display_id(), app.len());

    Ok(DiffResult {
        app,
        dependencies: include_dependencies.then(|| DEPENDENCIES_ADVISORY.to_string()),
        hosting: hosting.map(HostingDiff::lines).unwrap_or_default(),
    })
}

pub fn proposed_changes(diff: &DiffResult) -> Log {
    Log::list(
        "The following reflects the proposed changes to your app",
        diff.lines(),
    )
}
