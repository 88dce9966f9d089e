use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "carchain",
    about = "carchain: tamper-evident ledger of vehicle telemetry",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Chain file to operate on (overrides the config file).
    #[arg(long, global = true)]
    pub chain: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Append one telemetry record
    Submit(SubmitArgs),
    /// Show the recorded history of a vehicle
    History(HistoryArgs),
    /// Verify chain integrity
    Verify,
    /// Show ledger size, genesis and latest block
    Status,
    /// Print every block in the chain
    Dump,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct SubmitArgs {
    pub car_id: String,
    /// Telemetry record as a JSON object (camelCase field names).
    pub record: String,
}

#[derive(Args)]
pub struct HistoryArgs {
    pub car_id: String,
    /// Only blocks recorded on this UTC day (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<chrono::NaiveDate>,
}
