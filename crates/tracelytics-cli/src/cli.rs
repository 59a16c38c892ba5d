use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracelytics_types::{Checksum, Scope, TableName};

#[derive(Parser)]
#[command(
    name = "tracelytics",
    about = "Tracelytics record store: supply-chain tables keyed by checksum",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file, overriding `data_file` from the configuration
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute actions from a JSON file (`-` for stdin)
    Exec(ExecArgs),
    /// List rows of a table
    Query(QueryArgs),
    /// Print the sha256 checksum of each argument
    Checksum(ChecksumArgs),
    /// Print the table schema
    Schema,
    /// Generate an Ed25519 key pair
    Keygen,
    /// Sign a nonce for a push
    Sign(SignArgs),
}

#[derive(Args)]
pub struct ExecArgs {
    pub input: String,
    /// Run against the snapshot without writing it back
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    pub company: Scope,
    pub table: TableName,
    #[arg(long)]
    pub lower_bound: Option<Checksum>,
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct ChecksumArgs {
    #[arg(required = true)]
    pub values: Vec<String>,
}

#[derive(Args)]
pub struct SignArgs {
    /// Hex-encoded signing key
    #[arg(long)]
    pub key: String,
    /// The user's current nonce
    pub nonce: u64,
}
