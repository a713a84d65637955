//! Resolving which remote app a push targets.
//!
//! Order of precedence:
//! 1. `--as-new` always targets a new app.
//! 2. The target is `--to`, else the `app_id` recorded in the local config.
//! 3. No target, or a target nothing matches, means a new app.
//! 4. Several matches are disambiguated through the UI.
//!
//! The group of a new app is settled separately by [`require_group`], only
//! once the app is actually about to be created.

use skyward_core::{App, AppData, AppIdentity, RemoteClient};

use crate::error::{Stage, SyncError};
use crate::ui::Ui;

/// Targeting flags shared by `push` and `diff`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetInputs {
    /// Group (project) id.
    pub project: Option<String>,
    /// App id, client app id or name.
    pub to: Option<String>,
    pub as_new: bool,
}

impl TargetInputs {
    fn project(&self) -> Option<&str> {
        self.project.as_deref().filter(|p| !p.is_empty())
    }

    /// The filter used to look the app up, if any.
    pub fn target<'a>(&'a self, local: &'a AppData) -> Option<&'a str> {
        self.to
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| local.client_app_id())
    }
}

/// Resolve the remote identity for `local`.
///
/// A new app comes back with an empty `app_id`; its `group_id` is the
/// project or `default_group`, or empty when neither is known.
pub fn resolve(
    remote: &dyn RemoteClient,
    ui: &dyn Ui,
    inputs: &TargetInputs,
    local: &AppData,
    default_group: Option<&str>,
) -> Result<AppIdentity, SyncError> {
    if !inputs.as_new {
        if let Some(target) = inputs.target(local) {
            let apps = remote
                .find_apps(inputs.project(), target)
                .map_err(SyncError::at(Stage::ResolveApp))?;
            match apps.as_slice() {
                [] => tracing::info!("no remote app matches '{target}'; treating as new"),
                [app] => return Ok(AppIdentity::from(app)),
                _ => return choose(ui, target, &apps).map(AppIdentity::from),
            }
        }
    }

    let group_id = inputs
        .project()
        .or(default_group.filter(|g| !g.is_empty()))
        .unwrap_or_default();
    Ok(AppIdentity::new(group_id, ""))
}

/// Like [`resolve`] but the app must already exist.
pub fn resolve_existing(
    remote: &dyn RemoteClient,
    ui: &dyn Ui,
    inputs: &TargetInputs,
    local: &AppData,
) -> Result<AppIdentity, SyncError> {
    let inputs_existing = TargetInputs {
        as_new: false,
        ..inputs.clone()
    };
    let identity = resolve(remote, ui, &inputs_existing, local, None)?;
    if identity.is_new() {
        return Err(SyncError::AppNotFound {
            filter: inputs.target(local).unwrap_or("<none>").to_string(),
        });
    }
    Ok(identity)
}

/// Group for a new app: `group_id` when set, else asked for.
pub fn require_group(ui: &dyn Ui, group_id: &str) -> Result<String, SyncError> {
    if !group_id.is_empty() {
        return Ok(group_id.to_string());
    }
    if ui.auto_confirm() {
        return Err(SyncError::ProjectRequired);
    }
    let answer = ui.input("Project ID", None)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(SyncError::ProjectRequired);
    }
    Ok(answer.to_string())
}

fn choose<'a>(ui: &dyn Ui, filter: &str, apps: &'a [App]) -> Result<&'a App, SyncError> {
    if ui.auto_confirm() {
        return Err(SyncError::AmbiguousApp {
            filter: filter.to_string(),
            count: apps.len(),
        });
    }
    let labels: Vec<String> = apps.iter().map(app_label).collect();
    let choice = ui.select("Select App", &labels, None)?;
    apps.iter()
        .find(|app| app_label(app) == choice)
        .ok_or_else(|| SyncError::Prompt(format!("'{choice}' is not one of the listed apps")))
}

fn app_label(app: &App) -> String {
    format!("{} ({})", app.client_app_id, app.group_id)
}
