//! Error types for skyward-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use skyward_core::{DeploymentId, LocalError, RemoteError};

/// The step of a synchronization attempt that issued a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveApp,
    CreateApp,
    Diff,
    HostingAssets,
    CreateDraft,
    FetchDraft,
    DiffDraft,
    DiscardDraft,
    Import,
    DeployDraft,
    PollDeployment,
    ImportDependencies,
    UploadHosting,
    InvalidateCache,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::ResolveApp => "resolve app",
            Stage::CreateApp => "create app",
            Stage::Diff => "diff app",
            Stage::HostingAssets => "list hosting assets",
            Stage::CreateDraft => "create draft",
            Stage::FetchDraft => "fetch draft",
            Stage::DiffDraft => "diff draft",
            Stage::DiscardDraft => "discard draft",
            Stage::Import => "import app",
            Stage::DeployDraft => "deploy draft",
            Stage::PollDeployment => "poll deployment",
            Stage::ImportDependencies => "import dependencies",
            Stage::UploadHosting => "upload hosting asset",
            Stage::InvalidateCache => "invalidate hosting cache",
        };
        f.write_str(label)
    }
}

/// All errors that can arise from a synchronization attempt.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Loading or writing local state failed.
    #[error(transparent)]
    Local(#[from] LocalError),

    /// A remote call failed; `stage` says which step issued it.
    #[error("failed to {stage}: {source}")]
    Remote {
        stage: Stage,
        #[source]
        source: RemoteError,
    },

    /// Draft creation conflicted again right after discarding the old draft.
    #[error("a draft still exists for this app after discarding the previous one")]
    DraftConflict,

    /// The deployment reached the `failed` status.
    #[error("deployment {deployment_id} failed{}", message_suffix(.message))]
    DeploymentFailed {
        deployment_id: DeploymentId,
        message: Option<String>,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hosting cache JSON error.
    #[error("hosting cache JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The presentation layer could not collect an answer.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// `--to` matched no app.
    #[error("no app found matching '{filter}'")]
    AppNotFound { filter: String },

    /// `--to` matched several apps and no choice could be asked for.
    #[error("{count} apps match '{filter}'; narrow the filter with --project or --to")]
    AmbiguousApp { filter: String, count: usize },

    /// A new app needs a project and none was given.
    #[error("a project id is required to create a new app; pass --project")]
    ProjectRequired,
}

impl SyncError {
    /// Map a [`RemoteError`] to [`SyncError::Remote`] for `stage`.
    pub fn at(stage: Stage) -> impl FnOnce(RemoteError) -> SyncError {
        move |source| SyncError::Remote { stage, source }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_names_the_stage() {
        let err = SyncError::at(Stage::Import)(RemoteError::Transport("reset".to_string()));
        assert_eq!(err.to_string(), "failed to import app: transport error: reset");
    }

    #[test]
    fn deployment_failure_includes_server_message() {
        let err = SyncError::DeploymentFailed {
            deployment_id: DeploymentId::from("dep-1"),
            message: Some("invalid rule".to_string()),
        };
        assert_eq!(err.to_string(), "deployment dep-1 failed: invalid rule");
    }
}
