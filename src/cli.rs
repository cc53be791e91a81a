use crate::github::DEFAULT_API_URL;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "repoqual",
    version,
    about = "GitHub organization repository quality analysis CLI"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect, score, and write all report formats
    Analyze(AnalyzeCommand),
    /// Collect raw data only and persist it as a cache batch
    Fetch(FetchCommand),
    /// Re-score a persisted cache batch without network access
    Rescore(RescoreCommand),
    /// List the language names accepted by --languages
    Languages,
}

#[derive(Args)]
pub struct ApiArgs {
    /// GitHub organization name
    #[arg(long, env = "GITHUB_ORG")]
    pub org: String,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// API base URL (for GitHub Enterprise use https://your-host/api/v3)
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Skip TLS certificate verification (self-signed instances)
    #[arg(long)]
    pub no_ssl_verify: bool,
}

#[derive(Args)]
pub struct CollectionArgs {
    /// Maximum number of repositories to analyze
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only analyze repositories matching these languages
    #[arg(long, num_args = 1..)]
    pub languages: Vec<String>,

    /// Only analyze these specific repositories (case-insensitive)
    #[arg(long, num_args = 1..)]
    pub repos: Vec<String>,
}

#[derive(Args)]
pub struct AnalyzeCommand {
    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub collection: CollectionArgs,

    /// Directory for generated report files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Scoring configuration file (TOML); ./scoring.toml is used when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct FetchCommand {
    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub collection: CollectionArgs,

    /// Directory for the cache batch file
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Scoring configuration file (TOML); supplies collection thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct RescoreCommand {
    /// Cache batch file produced by `fetch` or `analyze`
    #[arg(long)]
    pub cache: PathBuf,

    /// Scoring configuration file (TOML); ./scoring.toml is used when present
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory for generated report files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}
