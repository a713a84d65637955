//! Error types for skyward-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or writing local state (app directory, profile).
#[derive(Debug, Error)]
pub enum LocalError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// None of the known app config files exist in the directory.
    #[error("no app config found in {dir} (expected realm_config.json, config.json or stitch.json)")]
    AppNotFound { dir: PathBuf },

    /// The app config file is not valid JSON.
    #[error("failed to parse app config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error on the write path.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The profile YAML is malformed.
    #[error("failed to parse profile at {path}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// No dependency archive next to the app's functions.
    #[error(
        "no dependencies archive found in {dir} (expected node_modules.zip, .tar, .tgz or .tar.gz)"
    )]
    DependenciesNotFound { dir: PathBuf },

    /// An identity field is set but holds no value we recognise.
    #[error("invalid {key} '{value}' in app config: {reason}")]
    InvalidField {
        key: String,
        value: String,
        reason: String,
    },
}

/// Convenience constructor for [`LocalError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LocalError {
    LocalError::Io {
        path: path.into(),
        source,
    }
}

/// Errors returned by a [`crate::RemoteClient`] implementation.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with an error payload.
    #[error("{message} (status {status}{})", code_suffix(.code))]
    Server {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a server answer (DNS, TLS, connection reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a body we could not decode.
    #[error("unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Reading a local file to send failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(", code {c}"))
        .unwrap_or_default()
}

/// Outcome of a failed draft creation.
///
/// The server allows one live draft per app; hitting that limit is a
/// recoverable conflict, not a generic failure.
#[derive(Debug, Error)]
pub enum CreateDraftError {
    #[error("a draft already exists for this app")]
    Conflict { existing_draft_id: Option<String> },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
