//! [`HttpClient`]: the admin API over blocking ureq calls.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use skyward_core::{
    App, AppData, AppIdentity, AppMeta, CreateDraftError, Deployment, DeploymentId, Draft,
    DraftDiff, DraftId, HostingAsset, HostingAssetUpload, Profile, RemoteClient, RemoteError,
};

use crate::wire::{self, AuthProfile, CreateAppRequest, InvalidateCacheRequest};

const API_PREFIX: &str = "/api/admin/v3.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpClient {
    base_url: String,
    access_token: Option<String>,
    agent: ureq::Agent,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            agent,
        }
    }

    pub fn from_profile(profile: &Profile) -> Self {
        Self::new(profile.base_url.clone(), profile.access_token.clone())
    }

    /// Absolute URL of an admin API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, &self.url(path))
            .set("Accept", "application/json");
        match &self.access_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        tracing::debug!("GET {path}");
        let response = send(path, self.request("GET", path).call())?;
        response_into_data(path, response)
    }

    fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        tracing::debug!("{method} {path}");
        let response = send(path, self.request(method, path).send_json(body))?;
        response_into_data(path, response)
    }

    /// Like [`Self::send_json`] for endpoints answering with no useful body.
    fn send_json_unit<B: Serialize>(
        &self,
        method: &str,
        path: &str,
        body: &B,
    ) -> Result<(), RemoteError> {
        tracing::debug!("{method} {path}");
        send(path, self.request(method, path).send_json(body)).map(|_| ())
    }

    fn delete(&self, request: ureq::Request, path: &str) -> Result<(), RemoteError> {
        tracing::debug!("DELETE {path}");
        send(path, request.call()).map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    fn group_apps_path(group_id: &str) -> String {
        format!("/groups/{group_id}/apps")
    }

    fn app_path(identity: &AppIdentity, suffix: &str) -> String {
        format!(
            "/groups/{}/apps/{}{suffix}",
            identity.group_id, identity.app_id
        )
    }

    fn group_ids(&self, group_id: Option<&str>) -> Result<Vec<String>, RemoteError> {
        match group_id {
            Some(id) => Ok(vec![id.to_string()]),
            None => self.get::<AuthProfile>("/auth/profile").map(|p| p.group_ids()),
        }
    }
}

/// Turn ureq's status errors into [`RemoteError::Server`].
fn send(
    endpoint: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, RemoteError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            tracing::debug!("{endpoint} answered {status}: {body}");
            Err(wire::server_error(status, &body))
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(RemoteError::Transport(transport.to_string()))
        }
    }
}

fn response_into_data<T: DeserializeOwned>(
    endpoint: &str,
    response: ureq::Response,
) -> Result<T, RemoteError> {
    response
        .into_json::<T>()
        .map_err(|e| RemoteError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
}

fn matches_filter(app: &App, filter: &str) -> bool {
    app.id == filter || app.client_app_id == filter || app.name == filter
}

// ---------------------------------------------------------------------------
// RemoteClient
// ---------------------------------------------------------------------------

impl RemoteClient for HttpClient {
    fn find_apps(&self, group_id: Option<&str>, filter: &str) -> Result<Vec<App>, RemoteError> {
        let mut found = Vec::new();
        for group in self.group_ids(group_id)? {
            let apps: Vec<App> = self.get(&Self::group_apps_path(&group))?;
            found.extend(apps.into_iter().filter(|app| matches_filter(app, filter)));
        }
        Ok(found)
    }

    fn create_app(&self, group_id: &str, name: &str, meta: AppMeta) -> Result<App, RemoteError> {
        self.send_json(
            "POST",
            &Self::group_apps_path(group_id),
            &CreateAppRequest::new(name, meta),
        )
    }

    fn diff(&self, identity: &AppIdentity, data: &AppData) -> Result<Vec<String>, RemoteError> {
        self.send_json("POST", &Self::app_path(identity, "/diff"), &data.payload())
    }

    fn hosting_assets(&self, identity: &AppIdentity) -> Result<Vec<HostingAsset>, RemoteError> {
        self.get(&Self::app_path(identity, "/hosting/assets"))
    }

    fn create_draft(&self, identity: &AppIdentity) -> Result<Draft, CreateDraftError> {
        self.send_json(
            "POST",
            &Self::app_path(identity, "/drafts"),
            &serde_json::json!({}),
        )
        .map_err(wire::create_draft_error)
    }

    fn draft(&self, identity: &AppIdentity) -> Result<Draft, RemoteError> {
        let path = Self::app_path(identity, "/drafts");
        let drafts: Vec<Draft> = self.get(&path)?;
        drafts.into_iter().next().ok_or_else(|| RemoteError::Server {
            status: 404,
            code: None,
            message: format!("no draft found for app {}", identity.display_id()),
        })
    }

    fn discard_draft(&self, identity: &AppIdentity, draft_id: &DraftId) -> Result<(), RemoteError> {
        let path = Self::app_path(identity, &format!("/drafts/{draft_id}"));
        self.delete(self.request("DELETE", &path), &path)
    }

    fn diff_draft(
        &self,
        identity: &AppIdentity,
        draft_id: &DraftId,
    ) -> Result<DraftDiff, RemoteError> {
        self.get(&Self::app_path(identity, &format!("/drafts/{draft_id}/diff")))
    }

    fn import(&self, identity: &AppIdentity, data: &AppData) -> Result<(), RemoteError> {
        self.send_json_unit("PUT", &Self::app_path(identity, "/import"), &data.payload())
    }

    fn import_dependencies(
        &self,
        identity: &AppIdentity,
        archive: &Path,
    ) -> Result<(), RemoteError> {
        let body = std::fs::read(archive).map_err(|source| RemoteError::Io {
            path: archive.to_path_buf(),
            source,
        })?;
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = Self::app_path(identity, "/dependencies/archive");
        tracing::debug!("PUT {path} ({} bytes)", body.len());
        let request = self
            .request("PUT", &path)
            .query("filename", &file_name)
            .set("Content-Type", "application/octet-stream");
        send(&path, request.send_bytes(&body)).map(|_| ())
    }

    fn deploy_draft(
        &self,
        identity: &AppIdentity,
        draft_id: &DraftId,
    ) -> Result<Deployment, RemoteError> {
        self.send_json(
            "POST",
            &Self::app_path(identity, &format!("/drafts/{draft_id}/deployment")),
            &serde_json::json!({}),
        )
    }

    fn deployment(
        &self,
        identity: &AppIdentity,
        deployment_id: &DeploymentId,
    ) -> Result<Deployment, RemoteError> {
        self.get(&Self::app_path(
            identity,
            &format!("/deployments/{deployment_id}"),
        ))
    }

    fn upload_hosting_asset(
        &self,
        identity: &AppIdentity,
        asset: &HostingAssetUpload,
    ) -> Result<(), RemoteError> {
        let path = Self::app_path(identity, "/hosting/assets/asset");
        tracing::debug!("PUT {path} {} ({} bytes)", asset.path, asset.file_size);
        let request = self
            .request("PUT", &path)
            .query("path", &asset.path)
            .query("hash", &asset.file_hash)
            .query("size", &asset.file_size.to_string())
            .set("Content-Type", "application/octet-stream");
        send(&path, request.send_bytes(&asset.body)).map(|_| ())
    }

    fn delete_hosting_asset(&self, identity: &AppIdentity, path: &str) -> Result<(), RemoteError> {
        let endpoint = Self::app_path(identity, "/hosting/assets/asset");
        let request = self.request("DELETE", &endpoint).query("path", path);
        self.delete(request, &endpoint)
    }

    fn invalidate_hosting_cache(
        &self,
        identity: &AppIdentity,
        path_pattern: &str,
    ) -> Result<(), RemoteError> {
        self.send_json_unit(
            "PUT",
            &Self::app_path(identity, "/hosting/cache"),
            &InvalidateCacheRequest {
                invalidate: true,
                path: path_pattern,
            },
        )
    }
}
