//! Skyward — push a local backend app definition to the hosting platform.
//!
//! # Usage
//!
//! ```text
//! skyward push [--local DIR] [--project ID] [--to APP] [--as-new] [--dry-run]
//!              [-d|--include-dependencies] [-s|--include-hosting]
//!              [-c|--reset-cdn-cache] [-y|--yes]
//! skyward diff [--local DIR] [--project ID] [--to APP] [-d] [-s] [-y]
//! ```
//!
//! `--verbose` (any subcommand) turns on debug logging; otherwise `RUST_LOG`
//! applies, defaulting to `warn`.

mod commands;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, push::PushArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "skyward",
    version,
    about = "Deploy a local backend app definition to the hosting platform",
    long_about = None,
)]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Push local app changes, then deploy them.
    Push(PushArgs),

    /// Show the changes a push would make, without making them.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Push(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
