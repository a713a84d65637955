//! Scripted collaborators for engine tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde_json::Value;
use skyward_core::{
    App, AppData, AppIdentity, AppMeta, CreateDraftError, Deployment, DeploymentId,
    DeploymentStatus, Draft, DraftDiff, DraftId, HostingAsset, HostingAssetUpload, RemoteClient,
    RemoteError,
};
use tempfile::TempDir;

use crate::error::SyncError;
use crate::ui::{Log, Ui};

// ---------------------------------------------------------------------------
// FakeRemote
// ---------------------------------------------------------------------------

/// Every call a [`FakeRemote`] received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindApps { group_id: Option<String>, filter: String },
    CreateApp { group_id: String, name: String, meta: AppMeta },
    Diff,
    HostingAssets,
    CreateDraft,
    Draft,
    DiscardDraft(DraftId),
    DiffDraft(DraftId),
    Import,
    ImportDependencies(PathBuf),
    DeployDraft(DraftId),
    Deployment(DeploymentId),
    UploadHostingAsset(String),
    DeleteHostingAsset(String),
    InvalidateHostingCache(String),
}

impl Call {
    /// `true` for calls that change remote state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateApp { .. }
                | Call::CreateDraft
                | Call::DiscardDraft(_)
                | Call::Import
                | Call::ImportDependencies(_)
                | Call::DeployDraft(_)
                | Call::UploadHostingAsset(_)
                | Call::DeleteHostingAsset(_)
                | Call::InvalidateHostingCache(_)
        )
    }
}

/// In-memory [`RemoteClient`] with scripted answers.
///
/// Unscripted calls succeed: drafts are created as `draft-1`, deployments
/// start `created` and report `successful` on the first re-fetch.
#[derive(Default)]
pub struct FakeRemote {
    calls: RefCell<Vec<Call>>,
    pub apps: RefCell<Vec<App>>,
    pub diff_lines: RefCell<Vec<String>>,
    pub assets: RefCell<Vec<HostingAsset>>,
    pub existing_draft: RefCell<Option<Draft>>,
    pub draft_diff: RefCell<DraftDiff>,
    create_draft_results: RefCell<VecDeque<Result<Draft, CreateDraftError>>>,
    deployment_results: RefCell<VecDeque<Result<Deployment, RemoteError>>>,
    diff_error: RefCell<Option<RemoteError>>,
    hosting_assets_error: RefCell<Option<RemoteError>>,
    discard_error: RefCell<Option<RemoteError>>,
    import_error: RefCell<Option<RemoteError>>,
    dependencies_error: RefCell<Option<RemoteError>>,
    invalidate_error: RefCell<Option<RemoteError>>,
    failing_uploads: RefCell<HashSet<String>>,
    failing_deletes: RefCell<HashMap<String, RemoteError>>,
    uploaded: RefCell<BTreeMap<String, Vec<u8>>>,
    created_apps: Cell<usize>,
}

impl FakeRemote {
    pub fn with_app(app: App) -> Self {
        let remote = Self::default();
        remote.apps.borrow_mut().push(app);
        remote
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn mutations(&self) -> usize {
        self.count(Call::is_mutation)
    }

    pub fn set_diff(&self, lines: &[&str]) {
        *self.diff_lines.borrow_mut() = lines.iter().map(|l| l.to_string()).collect();
    }

    pub fn push_create_draft(&self, result: Result<Draft, CreateDraftError>) {
        self.create_draft_results.borrow_mut().push_back(result);
    }

    /// Queue a conflict answer for the next draft creation.
    pub fn conflict_once(&self, existing: &str) {
        *self.existing_draft.borrow_mut() = Some(draft(existing));
        self.push_create_draft(Err(CreateDraftError::Conflict {
            existing_draft_id: Some(existing.to_string()),
        }));
    }

    /// Script the deployment: the first status comes back from the deploy
    /// call, the rest from successive re-fetches.
    pub fn script_deployment(&self, statuses: &[DeploymentStatus]) {
        let mut queue = self.deployment_results.borrow_mut();
        queue.clear();
        queue.extend(statuses.iter().map(|s| Ok(deployment("dep-1", *s))));
    }

    pub fn push_deployment_error(&self, err: RemoteError) {
        self.deployment_results.borrow_mut().push_back(Err(err));
    }

    pub fn fail_diff(&self, err: RemoteError) {
        *self.diff_error.borrow_mut() = Some(err);
    }

    pub fn fail_hosting_assets(&self, err: RemoteError) {
        *self.hosting_assets_error.borrow_mut() = Some(err);
    }

    pub fn fail_discard(&self, err: RemoteError) {
        *self.discard_error.borrow_mut() = Some(err);
    }

    pub fn fail_import(&self, err: RemoteError) {
        *self.import_error.borrow_mut() = Some(err);
    }

    pub fn fail_import_dependencies(&self, err: RemoteError) {
        *self.dependencies_error.borrow_mut() = Some(err);
    }

    pub fn fail_invalidate(&self, err: RemoteError) {
        *self.invalidate_error.borrow_mut() = Some(err);
    }

    pub fn fail_upload(&self, path: &str) {
        self.failing_uploads.borrow_mut().insert(path.to_string());
    }

    pub fn fail_delete(&self, path: &str, err: RemoteError) {
        self.failing_deletes.borrow_mut().insert(path.to_string(), err);
    }

    pub fn uploaded_bodies(&self) -> BTreeMap<String, Vec<u8>> {
        self.uploaded.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    /// Consume a scripted one-shot failure.
    fn take_error(slot: &RefCell<Option<RemoteError>>) -> Result<(), RemoteError> {
        match slot.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_deployment(&self) -> Result<Deployment, RemoteError> {
        self.deployment_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(deployment("dep-1", DeploymentStatus::Successful)))
    }
}

impl RemoteClient for FakeRemote {
    fn find_apps(&self, group_id: Option<&str>, filter: &str) -> Result<Vec<App>, RemoteError> {
        self.record(Call::FindApps {
            group_id: group_id.map(str::to_string),
            filter: filter.to_string(),
        });
        Ok(self
            .apps
            .borrow()
            .iter()
            .filter(|a| group_id.map_or(true, |g| a.group_id == g))
            .filter(|a| a.id == filter || a.client_app_id == filter || a.name == filter)
            .cloned()
            .collect())
    }

    fn create_app(&self, group_id: &str, name: &str, meta: AppMeta) -> Result<App, RemoteError> {
        self.record(Call::CreateApp {
            group_id: group_id.to_string(),
            name: name.to_string(),
            meta,
        });
        let n = self.created_apps.get() + 1;
        self.created_apps.set(n);
        let app = App {
            id: format!("new-app-{n}"),
            client_app_id: format!("{name}-abcde"),
            name: name.to_string(),
            group_id: group_id.to_string(),
            location: meta.location,
            deployment_model: meta.deployment_model,
        };
        self.apps.borrow_mut().push(app.clone());
        Ok(app)
    }

    fn diff(&self, _identity: &AppIdentity, _data: &AppData) -> Result<Vec<String>, RemoteError> {
        self.record(Call::Diff);
        Self::take_error(&self.diff_error)?;
        Ok(self.diff_lines.borrow().clone())
    }

    fn hosting_assets(&self, _identity: &AppIdentity) -> Result<Vec<HostingAsset>, RemoteError> {
        self.record(Call::HostingAssets);
        Self::take_error(&self.hosting_assets_error)?;
        Ok(self.assets.borrow().clone())
    }

    fn create_draft(&self, _identity: &AppIdentity) -> Result<Draft, CreateDraftError> {
        self.record(Call::CreateDraft);
        self.create_draft_results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(draft("draft-1")))
    }

    fn draft(&self, _identity: &AppIdentity) -> Result<Draft, RemoteError> {
        self.record(Call::Draft);
        self.existing_draft
            .borrow()
            .clone()
            .ok_or_else(|| server_error(404, "draft not found"))
    }

    fn discard_draft(
        &self,
        _identity: &AppIdentity,
        draft_id: &DraftId,
    ) -> Result<(), RemoteError> {
        self.record(Call::DiscardDraft(draft_id.clone()));
        match self.discard_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn diff_draft(
        &self,
        _identity: &AppIdentity,
        draft_id: &DraftId,
    ) -> Result<DraftDiff, RemoteError> {
        self.record(Call::DiffDraft(draft_id.clone()));
        Ok(self.draft_diff.borrow().clone())
    }

    fn import(&self, _identity: &AppIdentity, _data: &AppData) -> Result<(), RemoteError> {
        self.record(Call::Import);
        match self.import_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn import_dependencies(
        &self,
        _identity: &AppIdentity,
        archive: &Path,
    ) -> Result<(), RemoteError> {
        self.record(Call::ImportDependencies(archive.to_path_buf()));
        Self::take_error(&self.dependencies_error)
    }

    fn deploy_draft(
        &self,
        _identity: &AppIdentity,
        draft_id: &DraftId,
    ) -> Result<Deployment, RemoteError> {
        self.record(Call::DeployDraft(draft_id.clone()));
        match self.deployment_results.borrow_mut().pop_front() {
            Some(result) => result,
            None => Ok(deployment("dep-1", DeploymentStatus::Created)),
        }
    }

    fn deployment(
        &self,
        _identity: &AppIdentity,
        deployment_id: &DeploymentId,
    ) -> Result<Deployment, RemoteError> {
        self.record(Call::Deployment(deployment_id.clone()));
        self.next_deployment()
    }

    fn upload_hosting_asset(
        &self,
        _identity: &AppIdentity,
        asset: &HostingAssetUpload,
    ) -> Result<(), RemoteError> {
        self.record(Call::UploadHostingAsset(asset.path.clone()));
        if self.failing_uploads.borrow().contains(&asset.path) {
            return Err(server_error(500, "upload rejected"));
        }
        self.uploaded
            .borrow_mut()
            .insert(asset.path.clone(), asset.body.clone());
        Ok(())
    }

    fn delete_hosting_asset(&self, _identity: &AppIdentity, path: &str) -> Result<(), RemoteError> {
        self.record(Call::DeleteHostingAsset(path.to_string()));
        match self.failing_deletes.borrow_mut().remove(path) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn invalidate_hosting_cache(
        &self,
        _identity: &AppIdentity,
        path_pattern: &str,
    ) -> Result<(), RemoteError> {
        self.record(Call::InvalidateHostingCache(path_pattern.to_string()));
        Self::take_error(&self.invalidate_error)
    }
}

pub fn draft(id: &str) -> Draft {
    Draft {
        id: DraftId::from(id),
    }
}

pub fn deployment(id: &str, status: DeploymentStatus) -> Deployment {
    Deployment {
        id: DeploymentId::from(id),
        status,
        status_error_message: None,
    }
}

pub fn server_error(status: u16, message: &str) -> RemoteError {
    RemoteError::Server {
        status,
        code: None,
        message: message.to_string(),
    }
}

pub fn remote_app(id: &str, client_app_id: &str, group_id: &str) -> App {
    App {
        id: id.to_string(),
        client_app_id: client_app_id.to_string(),
        name: client_app_id.split('-').next().unwrap_or(client_app_id).to_string(),
        group_id: group_id.to_string(),
        ..App::default()
    }
}

// ---------------------------------------------------------------------------
// ScriptedUi
// ---------------------------------------------------------------------------

/// [`Ui`] answering from queues and recording everything shown.
///
/// An unscripted `confirm` is an error so tests notice unexpected prompts.
/// Unscripted `input` and `select` fall back to the default.
#[derive(Default)]
pub struct ScriptedUi {
    auto: bool,
    confirms: RefCell<VecDeque<bool>>,
    inputs: RefCell<VecDeque<String>>,
    selections: RefCell<VecDeque<String>>,
    logs: RefCell<Vec<Log>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedUi {
    pub fn auto() -> Self {
        Self {
            auto: true,
            ..Self::default()
        }
    }

    pub fn interactive() -> Self {
        Self::default()
    }

    pub fn with_confirms(self, answers: &[bool]) -> Self {
        self.confirms.borrow_mut().extend(answers.iter().copied());
        self
    }

    pub fn with_inputs(self, answers: &[&str]) -> Self {
        self.inputs
            .borrow_mut()
            .extend(answers.iter().map(|a| a.to_string()));
        self
    }

    pub fn with_selections(self, answers: &[&str]) -> Self {
        self.selections
            .borrow_mut()
            .extend(answers.iter().map(|a| a.to_string()));
        self
    }

    pub fn logs(&self) -> Vec<Log> {
        self.logs.borrow().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// `true` when any printed log mentions `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.logs.borrow().iter().any(|log| match log {
            Log::Text(t) | Log::Warning(t) => t.contains(needle),
            Log::List { title, items } | Log::Followup { title, items } => {
                title.contains(needle) || items.iter().any(|i| i.contains(needle))
            }
        })
    }

    pub fn warnings(&self) -> Vec<String> {
        self.logs
            .borrow()
            .iter()
            .filter_map(|log| match log {
                Log::Warning(w) => Some(w.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Ui for ScriptedUi {
    fn auto_confirm(&self) -> bool {
        self.auto
    }

    fn print(&self, log: Log) {
        self.logs.borrow_mut().push(log);
    }

    fn confirm(&self, message: &str) -> Result<bool, SyncError> {
        self.prompts.borrow_mut().push(message.to_string());
        self.confirms
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| SyncError::Prompt(format!("unexpected confirm: {message}")))
    }

    fn input(&self, message: &str, default: Option<&str>) -> Result<String, SyncError> {
        self.prompts.borrow_mut().push(message.to_string());
        Ok(self
            .inputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| default.unwrap_or_default().to_string()))
    }

    fn select(
        &self,
        message: &str,
        options: &[String],
        default: Option<&str>,
    ) -> Result<String, SyncError> {
        self.prompts.borrow_mut().push(message.to_string());
        if let Some(answer) = self.selections.borrow_mut().pop_front() {
            return Ok(answer);
        }
        default
            .map(str::to_string)
            .or_else(|| options.first().cloned())
            .ok_or_else(|| SyncError::Prompt(format!("no options for: {message}")))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// App directory holding a `realm_config.json` with `doc`.
pub fn app_dir(doc: Value) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("realm_config.json"), doc.to_string()).expect("write config");
    dir
}
