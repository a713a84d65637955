//! # skyward-sync
//!
//! Deployment synchronization engine.
//!
//! [`SyncOrchestrator::push`] runs one push attempt to completion or abort:
//! diff, confirm, draft, import, deploy, then the optional dependency,
//! hosting and CDN stages. The pieces are usable on their own:
//!
//! - [`diff`] — app diff plus dependency advisory and hosting lines
//! - [`hosting`] — local scan, reconcile, upload; [`hosting_cache`] persists hashes
//! - [`draft`] — draft acquisition with conflict recovery
//! - [`deploy`] — deployment polling with compensating discard
//! - [`identity`] — which remote app a push targets

pub mod deploy;
pub mod diff;
pub mod draft;
pub mod error;
pub mod hosting;
pub mod hosting_cache;
pub mod identity;
pub mod push;
pub mod ui;

#[cfg(test)]
mod testing;

pub use deploy::DeploymentPoller;
pub use diff::DiffResult;
pub use draft::DraftOutcome;
pub use error::{Stage, SyncError};
pub use hosting::{HostingDiff, UploadReport};
pub use identity::TargetInputs;
pub use push::{PushConfig, PushOptions, PushOutcome, PushSummary, SyncOrchestrator};
pub use ui::{Log, Ui};
