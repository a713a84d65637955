//! Deploying a draft and waiting for the job to settle.

use std::thread;
use std::time::Duration;

use skyward_core::{AppIdentity, Deployment, DraftId, RemoteClient};

use crate::error::{Stage, SyncError};
use crate::ui::{Log, Ui};

/// Warning shown when the compensating discard itself fails.
pub const DISCARD_FAILED_WARNING: &str = "Failed to discard the draft created for your deployment";

pub struct DeploymentPoller<'a> {
    remote: &'a dyn RemoteClient,
    ui: &'a dyn Ui,
    interval: Duration,
}

impl<'a> DeploymentPoller<'a> {
    pub fn new(remote: &'a dyn RemoteClient, ui: &'a dyn Ui, interval: Duration) -> Self {
        Self {
            remote,
            ui,
            interval,
        }
    }

    /// Deploy `draft_id` and poll until the deployment leaves the in-flight
    /// statuses.
    ///
    /// A `failed` deployment is returned like any other terminal status. If a
    /// status re-fetch fails, the draft is discarded (best effort) and the
    /// re-fetch error is returned.
    pub fn deploy_and_wait(
        &self,
        identity: &AppIdentity,
        draft_id: &DraftId,
    ) -> Result<Deployment, SyncError> {
        let mut deployment = self
            .remote
            .deploy_draft(identity, draft_id)
            .map_err(SyncError::at(Stage::DeployDraft))?;
        tracing::info!("deployment {} is {}", deployment.id, deployment.status);

        while deployment.status.is_in_flight() {
            thread::sleep(self.interval);

            deployment = match self.remote.deployment(identity, &deployment.id) {
                Ok(next) => next,
                Err(err) => {
                    self.compensate(identity, draft_id);
                    return Err(SyncError::at(Stage::PollDeployment)(err));
                }
            };
            tracing::debug!("deployment {} is {}", deployment.id, deployment.status);
        }

        Ok(deployment)
    }

    fn compensate(&self, identity: &AppIdentity, draft_id: &DraftId) {
        if let Err(err) = self.remote.discard_draft(identity, draft_id) {
            tracing::warn!("failed to discard draft {draft_id}: {err}");
            self.ui.print(Log::warning(DISCARD_FAILED_WARNING));
        }
    }
}
