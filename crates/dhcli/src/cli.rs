//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// dhcli - inventory queries and self-update
#[derive(Parser, Debug)]
#[command(name = "dhcli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to runtime.yaml (default: ~/.dhcli/runtime.yaml)
    #[arg(long, global = true, env = "DHCLI_RUNTIME_CONFIG")]
    pub runtime_config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Update dhcli to the published version
    Update(UpdateArgs),

    /// Show dhcli version
    Version(VersionArgs),
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Update from the staging channel
    #[arg(short, long)]
    pub staging: bool,

    /// Fetch and verify the new binary without installing it
    #[arg(short, long)]
    pub dry_run: bool,

    /// Hide the download progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
