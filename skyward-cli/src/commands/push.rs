//! `skyward push` — diff, confirm, draft, import and deploy.

use anyhow::{Context, Result};
use clap::Args;

use skyward_client::HttpClient;
use skyward_sync::{PushOptions, SyncOrchestrator};

use super::{Environment, TargetArgs};
use crate::terminal::TerminalUi;

/// Arguments for `skyward push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Create a new app even if the local config names an existing one.
    #[arg(long)]
    pub as_new: bool,

    /// Show the changes without pushing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Upload the functions dependency archive after deploying.
    #[arg(short = 'd', long)]
    pub include_dependencies: bool,

    /// Reconcile and upload static hosting files.
    #[arg(short = 's', long)]
    pub include_hosting: bool,

    /// Invalidate the CDN cache after uploading hosting files.
    #[arg(short = 'c', long, requires = "include_hosting")]
    pub reset_cdn_cache: bool,

    /// Answer yes to every confirmation.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::load(self.target.local.as_deref())?;
        let client = HttpClient::from_profile(&env.profile);
        let ui = TerminalUi::new(self.yes);

        let options = PushOptions {
            target: self.target.inputs(self.as_new),
            dry_run: self.dry_run,
            include_dependencies: self.include_dependencies,
            include_hosting: self.include_hosting,
            reset_cdn_cache: self.reset_cdn_cache,
        };
        let outcome = SyncOrchestrator::new(&client, &ui, env.push_config())
            .push(&options)
            .with_context(|| format!("push failed for '{}'", env.app_dir.display()))?;
        tracing::debug!("push outcome: {outcome:?}");
        Ok(())
    }
}
