//! The push pipeline: diff → confirm → draft → import → deploy → optional
//! dependency, hosting and CDN stages.

use std::path::PathBuf;
use std::time::Duration;

use skyward_core::{
    App, AppIdentity, AppMeta, AppMetadataProvider, Deployment, DeploymentModel,
    DeploymentStatus, LocalApp, Location, RemoteClient,
};

use crate::deploy::DeploymentPoller;
use crate::diff::{self, DiffResult};
use crate::draft::{self, DraftOutcome};
use crate::error::{Stage, SyncError};
use crate::hosting::{self, HostingDiff, LocalAssets, UploadReport};
use crate::hosting_cache::{self, HostingCacheFile};
use crate::identity::{self, TargetInputs};
use crate::ui::{Log, Ui};

/// Pattern invalidating every CDN entry of the app.
pub const CDN_INVALIDATE_ALL: &str = "/*";

/// Everything the orchestrator needs from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConfig {
    pub app_dir: PathBuf,
    pub hosting_cache_path: PathBuf,
    pub poll_interval: Duration,
    pub default_group_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOptions {
    pub target: TargetInputs,
    pub dry_run: bool,
    pub include_dependencies: bool,
    pub include_hosting: bool,
    pub reset_cdn_cache: bool,
}

/// How a push attempt ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Dry run against an app that does not exist yet.
    NewAppDryRun,
    NoChanges,
    DryRun(DiffResult),
    /// The user declined a confirmation.
    Aborted,
    Pushed(PushSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSummary {
    pub app: AppIdentity,
    pub deployment: Deployment,
    pub hosting: Option<UploadReport>,
}

/// Local and remote hosting state captured before the diff.
struct HostingPlan {
    cache: HostingCacheFile,
    local: LocalAssets,
    diff: HostingDiff,
}

pub struct SyncOrchestrator<'a> {
    remote: &'a dyn RemoteClient,
    ui: &'a dyn Ui,
    config: PushConfig,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(remote: &'a dyn RemoteClient, ui: &'a dyn Ui, config: PushConfig) -> Self {
        Self { remote, ui, config }
    }

    pub fn push(&self, opts: &PushOptions) -> Result<PushOutcome, SyncError> {
        let ui = self.ui;
        let mut app = LocalApp::load(&self.config.app_dir)?;
        let mut identity = identity::resolve(
            self.remote,
            ui,
            &opts.target,
            &app.data,
            self.config.default_group_id.as_deref(),
        )?;

        let mut is_new = false;
        if identity.is_new() {
            if opts.dry_run {
                ui.print(Log::text(
                    "This is a new app. To create a new app, you must omit the 'dry-run' flag to proceed",
                ));
                ui.print(Log::suggested_commands(vec![self.command_string(opts)]));
                return Ok(PushOutcome::NewAppDryRun);
            }
            let Some(created) = self.create_app(&mut app, &identity.group_id)? else {
                return Ok(PushOutcome::Aborted);
            };
            tracing::info!("created app {} ({})", created.client_app_id, created.id);
            identity = AppIdentity::from(&created);
            is_new = true;
        }

        ui.print(Log::text("Determining changes"));
        let mut hosting = if opts.include_hosting {
            Some(self.plan_hosting(&app, &identity)?)
        } else {
            None
        };
        let changes = diff::compute(
            self.remote,
            &identity,
            &app.data,
            opts.include_dependencies,
            hosting.as_ref().map(|plan| &plan.diff),
        )?;

        if changes.is_empty() {
            ui.print(Log::text(
                "Deployed app is identical to proposed version, nothing to do",
            ));
            return Ok(PushOutcome::NoChanges);
        }

        if opts.dry_run || (!ui.auto_confirm() && !is_new) {
            ui.print(diff::proposed_changes(&changes));
        }

        if opts.dry_run {
            ui.print(Log::text(
                "To push these changes, you must omit the 'dry-run' flag to proceed",
            ));
            ui.print(Log::suggested_commands(vec![self.command_string(opts)]));
            return Ok(PushOutcome::DryRun(changes));
        }

        if !ui.auto_confirm() && !is_new && !ui.confirm("Please confirm the changes shown above")? {
            return Ok(PushOutcome::Aborted);
        }

        ui.print(Log::text("Creating draft"));
        let draft = match draft::acquire(self.remote, ui, &identity)? {
            DraftOutcome::Created(draft) => draft,
            DraftOutcome::Declined => return Ok(PushOutcome::Aborted),
        };

        ui.print(Log::text("Pushing changes"));
        self.remote
            .import(&identity, &app.data)
            .map_err(SyncError::at(Stage::Import))?;

        ui.print(Log::text("Deploying draft"));
        let deployment = DeploymentPoller::new(self.remote, ui, self.config.poll_interval)
            .deploy_and_wait(&identity, &draft.id)?;
        if deployment.status == DeploymentStatus::Failed {
            return Err(SyncError::DeploymentFailed {
                deployment_id: deployment.id,
                message: deployment.status_error_message,
            });
        }
        ui.print(Log::text("Deployment complete"));

        if opts.include_dependencies {
            let archive = app.dependencies_archive()?;
            tracing::info!("uploading dependencies from {}", archive.display());
            self.remote
                .import_dependencies(&identity, &archive)
                .map_err(SyncError::at(Stage::ImportDependencies))?;
            ui.print(Log::text("Uploaded dependencies archive"));
        }

        let mut hosting_report = None;
        if let Some(plan) = hosting.as_mut() {
            let report = hosting::upload_assets(
                self.remote,
                &identity,
                &plan.local,
                &plan.diff,
                &mut |err: SyncError| ui.print(Log::warning(err.to_string())),
            );
            hosting::record_upload(&mut plan.cache, &identity.app_id, &plan.local, &report);
            hosting_cache::save(&self.config.hosting_cache_path, &plan.cache)?;
            ui.print(Log::text("Imported hosting assets"));

            if opts.reset_cdn_cache {
                self.remote
                    .invalidate_hosting_cache(&identity, CDN_INVALIDATE_ALL)
                    .map_err(SyncError::at(Stage::InvalidateCache))?;
                ui.print(Log::text("Reset CDN cache"));
            }
            hosting_report = Some(report);
        }

        ui.print(Log::text(format!(
            "Successfully pushed app up: {}",
            identity.display_id()
        )));
        Ok(PushOutcome::Pushed(PushSummary {
            app: identity,
            deployment,
            hosting: hosting_report,
        }))
    }

    /// Changes a push would make to an existing app, without touching it.
    pub fn diff(
        &self,
        target: &TargetInputs,
        include_dependencies: bool,
        include_hosting: bool,
    ) -> Result<DiffResult, SyncError> {
        let app = LocalApp::load(&self.config.app_dir)?;
        let identity = identity::resolve_existing(self.remote, self.ui, target, &app.data)?;

        let hosting = if include_hosting {
            Some(self.plan_hosting(&app, &identity)?)
        } else {
            None
        };
        let changes = diff::compute(
            self.remote,
            &identity,
            &app.data,
            include_dependencies,
            hosting.as_ref().map(|plan| &plan.diff),
        )?;

        if changes.is_empty() {
            self.ui
                .print(Log::text("Deployed app is identical to proposed version"));
        } else {
            self.ui.print(diff::proposed_changes(&changes));
        }
        Ok(changes)
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Ask for the new app's placement and create it. `None` when declined.
    fn create_app(&self, app: &mut LocalApp, group_id: &str) -> Result<Option<App>, SyncError> {
        let ui = self.ui;
        let auto = ui.auto_confirm();
        let local_location = app.data.location()?;
        let local_model = app.data.deployment_model()?;
        let group_id = identity::require_group(ui, group_id)?;

        if !auto && !ui.confirm("Do you wish to create a new app?")? {
            return Ok(None);
        }

        let local_name = app.data.name().unwrap_or_default().to_string();
        let name = if local_name.is_empty() || !auto {
            let default = Some(local_name.as_str()).filter(|n| !n.is_empty());
            ui.input("App Name", default)?
        } else {
            local_name
        };

        let mut location = local_location.unwrap_or_default();
        let mut deployment_model = local_model.unwrap_or_default();
        if !auto {
            let options: Vec<String> = Location::ALL.iter().map(|l| l.to_string()).collect();
            location = ui
                .select("App Location", &options, Some(location.as_str()))?
                .parse::<Location>()
                .map_err(SyncError::Prompt)?;

            let options: Vec<String> =
                DeploymentModel::ALL.iter().map(|m| m.to_string()).collect();
            deployment_model = ui
                .select("App Deployment Model", &options, Some(deployment_model.as_str()))?
                .parse::<DeploymentModel>()
                .map_err(SyncError::Prompt)?;
        }

        let meta = AppMeta {
            location,
            deployment_model,
        };
        let created = self
            .remote
            .create_app(&group_id, &name, meta)
            .map_err(SyncError::at(Stage::CreateApp))?;
        app.write_identity(&created)?;
        Ok(Some(created))
    }

    fn plan_hosting(
        &self,
        app: &LocalApp,
        identity: &AppIdentity,
    ) -> Result<HostingPlan, SyncError> {
        let cache = hosting_cache::load(&self.config.hosting_cache_path)?;
        let local = hosting::scan(&app.hosting_files_dir(), cache.app(&identity.app_id))?;
        let assets = self
            .remote
            .hosting_assets(identity)
            .map_err(SyncError::at(Stage::HostingAssets))?;
        let diff = hosting::reconcile(&local.manifest(), &hosting::remote_manifest(&assets));
        tracing::debug!(
            "hosting: {} local asset(s), {} remote, {} change(s)",
            local.assets.len(),
            assets.len(),
            diff.size()
        );
        Ok(HostingPlan { cache, local, diff })
    }

    /// The command to run for a real push with the same inputs.
    fn command_string(&self, opts: &PushOptions) -> String {
        let mut cmd = format!("skyward push --local {}", self.config.app_dir.display());
        if let Some(project) = opts.target.project.as_deref().filter(|p| !p.is_empty()) {
            cmd.push_str(&format!(" --project {project}"));
        }
        if let Some(to) = opts.target.to.as_deref().filter(|t| !t.is_empty()) {
            cmd.push_str(&format!(" --to {to}"));
        }
        if opts.target.as_new {
            cmd.push_str(" --as-new");
        }
        if opts.include_dependencies {
            cmd.push_str(" --include-dependencies");
        }
        if opts.include_hosting {
            cmd.push_str(" --include-hosting");
        }
        if opts.reset_cdn_cache {
            cmd.push_str(" --reset-cdn-cache");
        }
        cmd
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
