//! Request and response bodies of the admin API, plus error decoding.

use serde::{Deserialize, Serialize};

use skyward_core::{AppMeta, CreateDraftError, DeploymentModel, Location, RemoteError};

/// Server error code for the one-draft-per-app limit.
pub const ERR_CODE_DRAFT_ALREADY_EXISTS: &str = "DraftAlreadyExists";

/// Error payload the admin API answers with on non-2xx statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// `POST /groups/{group}/apps`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateAppRequest<'a> {
    pub name: &'a str,
    pub location: Location,
    pub deployment_model: DeploymentModel,
}

impl<'a> CreateAppRequest<'a> {
    pub fn new(name: &'a str, meta: AppMeta) -> Self {
        Self {
            name,
            location: meta.location,
            deployment_model: meta.deployment_model,
        }
    }
}

/// `PUT .../hosting/cache`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidateCacheRequest<'a> {
    pub invalidate: bool,
    pub path: &'a str,
}

/// `GET /auth/profile`, reduced to the groups the caller can see.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthProfile {
    #[serde(default)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub group_id: Option<String>,
}

impl AuthProfile {
    /// Distinct group ids, in first-seen order.
    pub fn group_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self.roles.iter().filter_map(|r| r.group_id.as_deref()) {
            if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

/// Build a [`RemoteError::Server`] from a status and raw response body.
///
/// Falls back to the raw body (or a generic message when empty) if it is
/// not a JSON error payload.
pub fn server_error(status: u16, body: &str) -> RemoteError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| format!("request failed with status {status}"));
    RemoteError::Server {
        status,
        code: parsed.error_code.filter(|c| !c.is_empty()),
        message,
    }
}

/// Split the draft conflict out of a draft creation failure.
pub fn create_draft_error(err: RemoteError) -> CreateDraftError {
    match err {
        RemoteError::Server {
            code: Some(ref code),
            ref message,
            ..
        } if code == ERR_CODE_DRAFT_ALREADY_EXISTS => CreateDraftError::Conflict {
            existing_draft_id: draft_id_in(message),
        },
        other => CreateDraftError::Remote(other),
    }
}

/// The server names the existing draft as the last word of its message,
/// e.g. `draft already exists: 5f1a...`; absent otherwise.
fn draft_id_in(message: &str) -> Option<String> {
    let (_, tail) = message.rsplit_once(": ")?;
    let id = tail.trim();
    (!id.is_empty() && !id.contains(' ')).then(|| id.to_string())
}
