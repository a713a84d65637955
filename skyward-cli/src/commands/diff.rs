//! `skyward diff` — show what a push would change on an existing app.

use anyhow::{Context, Result};
use clap::Args;

use skyward_client::HttpClient;
use skyward_sync::SyncOrchestrator;

use super::{Environment, TargetArgs};
use crate::terminal::TerminalUi;

/// Arguments for `skyward diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Include the functions dependency advisory.
    #[arg(short = 'd', long)]
    pub include_dependencies: bool,

    /// Include static hosting changes.
    #[arg(short = 's', long)]
    pub include_hosting: bool,

    /// Never prompt; fail instead of asking which app is meant.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::load(self.target.local.as_deref())?;
        let client = HttpClient::from_profile(&env.profile);
        let ui = TerminalUi::new(self.yes);

        SyncOrchestrator::new(&client, &ui, env.push_config())
            .diff(
                &self.target.inputs(false),
                self.include_dependencies,
                self.include_hosting,
            )
            .with_context(|| format!("diff failed for '{}'", env.app_dir.display()))?;
        Ok(())
    }
}
