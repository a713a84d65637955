//! Acquiring the app's single draft.
//!
//! ```text
//! Requesting ──ok──────────────▶ Created
//!     │ conflict (first)
//!     ▼
//! Conflict ──declined──────────▶ Declined
//!     │ accepted / auto-confirm
//!     ▼
//! Discarding ──▶ Requesting (retried; a second conflict is fatal)
//! ```

use skyward_core::{AppIdentity, CreateDraftError, Draft, DraftDiff, RemoteClient};

use crate::error::{Stage, SyncError};
use crate::ui::{Log, Ui};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    Created(Draft),
    /// The user chose to keep the existing draft.
    Declined,
}

#[derive(Debug)]
enum DraftState {
    Requesting { retried: bool },
    Conflict,
    Discarding(Draft),
}

/// Create a draft, discarding an existing one first if the user agrees.
pub fn acquire(
    remote: &dyn RemoteClient,
    ui: &dyn Ui,
    identity: &AppIdentity,
) -> Result<DraftOutcome, SyncError> {
    let mut state = DraftState::Requesting { retried: false };
    loop {
        state = match state {
            DraftState::Requesting { retried } => match remote.create_draft(identity) {
                Ok(draft) => {
                    tracing::debug!("created draft {}", draft.id);
                    return Ok(DraftOutcome::Created(draft));
                }
                Err(CreateDraftError::Conflict { existing_draft_id }) if !retried => {
                    tracing::info!(
                        "draft already exists for {} ({})",
                        identity.display_id(),
                        existing_draft_id.as_deref().unwrap_or("unknown id")
                    );
                    DraftState::Conflict
                }
                Err(CreateDraftError::Conflict { .. }) => return Err(SyncError::DraftConflict),
                Err(CreateDraftError::Remote(err)) => {
                    return Err(SyncError::at(Stage::CreateDraft)(err))
                }
            },

            DraftState::Conflict => {
                let existing = remote
                    .draft(identity)
                    .map_err(SyncError::at(Stage::FetchDraft))?;
                if !ui.auto_confirm() {
                    let diff = remote
                        .diff_draft(identity, &existing.id)
                        .map_err(SyncError::at(Stage::DiffDraft))?;
                    for log in draft_diff_logs(&diff) {
                        ui.print(log);
                    }
                    if !ui.confirm("Would you like to discard this draft?")? {
                        return Ok(DraftOutcome::Declined);
                    }
                }
                DraftState::Discarding(existing)
            }

            DraftState::Discarding(existing) => {
                remote
                    .discard_draft(identity, &existing.id)
                    .map_err(SyncError::at(Stage::DiscardDraft))?;
                tracing::debug!("discarded draft {}", existing.id);
                DraftState::Requesting { retried: true }
            }
        };
    }
}

/// Each non-empty part of an existing draft's diff as its own log.
pub fn draft_diff_logs(diff: &DraftDiff) -> Vec<Log> {
    if !diff.has_changes() {
        return vec![Log::text("An empty draft already exists for your app")];
    }

    let mut logs = vec![Log::list(
        "The following draft already exists for your app...",
        diff.diff_list(),
    )];
    if diff.hosting_files_diff.has_changes() {
        logs.push(Log::list(
            "With changes to your static hosting files...",
            diff.hosting_files_diff.diff_list(),
        ));
    }
    if diff.dependencies_diff.has_changes() {
        logs.push(Log::list(
            "With changes to your app dependencies...",
            diff.dependencies_diff.diff_list(),
        ));
    }
    if diff.graphql_config_diff.has_changes() {
        logs.push(Log::list(
            "With changes to your GraphQL configuration...",
            diff.graphql_config_diff.diff_list(),
        ));
    }
    if diff.schema_options_diff.has_changes() {
        logs.push(Log::list(
            "With changes to your app schema...",
            diff.schema_options_diff.diff_list(),
        ));
    }
    logs
}
