//! Skyward core library — domain types, local app loading, profile, errors.
//!
//! - [`types`] — identity, drafts, deployments, hosting manifest, draft diffs
//! - [`local`] — app directory loading and [`AppMetadataProvider`]
//! - [`profile`] — `~/.skyward` paths and user profile
//! - [`remote`] — the [`RemoteClient`] port implemented by the HTTP client
//! - [`error`] — [`LocalError`], [`RemoteError`], [`CreateDraftError`]

pub mod error;
pub mod local;
pub mod profile;
pub mod remote;
pub mod types;

pub use error::{CreateDraftError, LocalError, RemoteError};
pub use local::{AppData, AppMetadataProvider, ConfigVersion, LocalApp};
pub use profile::Profile;
pub use remote::{HostingAssetUpload, RemoteClient};
pub use types::{
    App, AppIdentity, AppMeta, Deployment, DeploymentId, DeploymentModel, DeploymentStatus, Draft,
    DraftDiff, DraftId, HostingAsset, Location,
};
