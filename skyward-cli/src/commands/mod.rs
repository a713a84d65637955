pub mod diff;
pub mod push;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use skyward_core::{profile, Profile};
use skyward_sync::{PushConfig, TargetInputs};

/// Flags selecting the local app and its remote target.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// App directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub local: Option<PathBuf>,

    /// Project (group) id of the remote app.
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Remote app id, client app id or name.
    #[arg(long, value_name = "APP")]
    pub to: Option<String>,
}

impl TargetArgs {
    pub fn inputs(&self, as_new: bool) -> TargetInputs {
        TargetInputs {
            project: self.project.clone(),
            to: self.to.clone(),
            as_new,
        }
    }
}

/// Home, profile and app directory resolved for one invocation.
pub struct Environment {
    pub home: PathBuf,
    pub profile: Profile,
    pub app_dir: PathBuf,
}

impl Environment {
    pub fn load(local: Option<&Path>) -> Result<Self> {
        let home = profile::home().context("could not determine home directory")?;
        let profile = profile::load_at(&home)
            .context("failed to load profile")?
            .with_env_overrides();
        let app_dir = match local {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        tracing::debug!("app dir {}, remote {}", app_dir.display(), profile.base_url);
        Ok(Self {
            home,
            profile,
            app_dir,
        })
    }

    pub fn push_config(&self) -> PushConfig {
        PushConfig {
            app_dir: self.app_dir.clone(),
            hosting_cache_path: profile::hosting_cache_path_at(&self.home),
            poll_interval: self.profile.poll_interval(),
            default_group_id: self.profile.default_group_id.clone(),
        }
    }
}
