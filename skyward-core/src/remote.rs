//! Port to the remote hosting platform.
//!
//! All calls are blocking. Implementations report failures as
//! [`RemoteError`]; draft creation additionally distinguishes the
//! one-draft-per-app conflict through [`CreateDraftError::Conflict`].

use std::path::Path;

use crate::error::{CreateDraftError, RemoteError};
use crate::local::AppData;
use crate::types::{
    App, AppIdentity, AppMeta, Deployment, DeploymentId, Draft, DraftDiff, DraftId, HostingAsset,
};

/// One hosting asset to upload, read from the local hosting root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingAssetUpload {
    /// `/`-prefixed asset path, e.g. `/css/site.css`.
    pub path: String,
    pub file_hash: String,
    pub file_size: u64,
    pub body: Vec<u8>,
}

pub trait RemoteClient {
    /// Apps in `group_id` (all groups when `None`) whose id, client app id or
    /// name matches `filter`.
    fn find_apps(&self, group_id: Option<&str>, filter: &str) -> Result<Vec<App>, RemoteError>;

    fn create_app(&self, group_id: &str, name: &str, meta: AppMeta) -> Result<App, RemoteError>;

    /// Ordered change lines between the deployed app and `data`.
    fn diff(&self, identity: &AppIdentity, data: &AppData) -> Result<Vec<String>, RemoteError>;

    fn hosting_assets(&self, identity: &AppIdentity) -> Result<Vec<HostingAsset>, RemoteError>;

    fn create_draft(&self, identity: &AppIdentity) -> Result<Draft, CreateDraftError>;

    /// The app's current draft.
    fn draft(&self, identity: &AppIdentity) -> Result<Draft, RemoteError>;

    fn discard_draft(&self, identity: &AppIdentity, draft_id: &DraftId) -> Result<(), RemoteError>;

    fn diff_draft(&self, identity: &AppIdentity, draft_id: &DraftId)
        -> Result<DraftDiff, RemoteError>;

    fn import(&self, identity: &AppIdentity, data: &AppData) -> Result<(), RemoteError>;

    fn import_dependencies(&self, identity: &AppIdentity, archive: &Path)
        -> Result<(), RemoteError>;

    fn deploy_draft(&self, identity: &AppIdentity, draft_id: &DraftId)
        -> Result<Deployment, RemoteError>;

    /// Refresh a deployment's status.
    fn deployment(
        &self,
        identity: &AppIdentity,
        deployment_id: &DeploymentId,
    ) -> Result<Deployment, RemoteError>;

    fn upload_hosting_asset(
        &self,
        identity: &AppIdentity,
        asset: &HostingAssetUpload,
    ) -> Result<(), RemoteError>;

    fn delete_hosting_asset(&self, identity: &AppIdentity, path: &str) -> Result<(), RemoteError>;

    /// Invalidate CDN entries matching `path_pattern` (e.g. `/*`).
    fn invalidate_hosting_cache(
        &self,
        identity: &AppIdentity,
        path_pattern: &str,
    ) -> Result<(), RemoteError>;
}
