use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Squadopt Contributors",
    version,
    about = "squadopt CLI - Composes squads by jointly choosing a build for every player and splitting the roster into sub-groups of five.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of parallel search threads.
    /// Used when neither `--workers` nor the config file says otherwise.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize a squad composition and write the result as JSON.
    Optimize(OptimizeArgs),
    /// Build the optimization model for a request without solving it.
    Inspect(InspectArgs),
}

/// Arguments for the `optimize` subcommand.
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    // --- Core Arguments ---
    /// Path to the request file (TOML or JSON) listing players and builds.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub request: PathBuf,

    /// Path to the capability table in TOML format.
    #[arg(short = 'k', long, required = true, value_name = "PATH")]
    pub capabilities: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path for the result JSON. Printed to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Solver Overrides ---
    /// Override the wall-clock budget of the solve, in milliseconds.
    #[arg(short, long, value_name = "MS")]
    pub time_limit_ms: Option<u64>,

    /// Override the number of parallel search workers.
    #[arg(short, long, value_name = "INT")]
    pub workers: Option<usize>,

    /// Override the random seed of the search workers.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Set a specific configuration value, overriding the config and request files.
    /// Can be used multiple times. Example: -S weights.quickness=2.0
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the request file (TOML or JSON) listing players and builds.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub request: PathBuf,

    /// Path to the capability table in TOML format.
    #[arg(short = 'k', long, required = true, value_name = "PATH")]
    pub capabilities: PathBuf,
}
