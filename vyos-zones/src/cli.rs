use std::path::PathBuf;

use clap::{ArgAction, Parser};
use vyos_zones::settings::OutputFormat;
use zone_policy_core::State;

#[derive(Parser, Debug)]
#[command(name = "vyos-zones")]
#[command(about = "Reconcile VyOS firewall zone-policy configuration")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Compare a declared zone list with a device and emit commands.
    Reconcile(ReconcileArgs),
    /// Print the zone facts found in a configuration dump.
    Facts(FactsArgs),
}

#[derive(Parser, Debug)]
pub struct ReconcileArgs {
    /// merged, replaced, overridden, deleted, gathered, rendered or parsed.
    #[arg(long)]
    pub state: Option<State>,
    /// Want document (.json or .toml).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Configuration dump to parse offline (state parsed).
    #[arg(long)]
    pub running_config: Option<PathBuf>,
    /// Configuration dump standing in for the device.
    #[arg(long)]
    pub device: Option<PathBuf>,
    /// Report commands without handing them to the device.
    #[arg(long)]
    pub check: bool,
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
    /// Write executed commands here.
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct FactsArgs {
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
