//! Clap derive structures for the `sealminer` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sealminer -- manage Sealminer ASIC miners over their web API
#[derive(Debug, Parser)]
#[command(
    name = "sealminer",
    version,
    about = "Manage Sealminer ASIC miners from the command line",
    long_about = "Talks to the miner's embedded web server (cgi-bin API) over plain HTTP.\n\n\
        Logs in with the `seal` account on first use and reuses the session\n\
        for every command in the same invocation.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Miner profile to use
    #[arg(long, short = 'm', env = "SEALMINER_PROFILE", global = true)]
    pub miner: Option<String>,

    /// Miner IP address or hostname (overrides profile)
    #[arg(long, short = 'H', env = "SEALMINER_HOST", global = true)]
    pub host: Option<String>,

    /// Web server port (overrides profile)
    #[arg(long, env = "SEALMINER_PORT", global = true)]
    pub port: Option<u16>,

    /// Web password for the `seal` account
    #[arg(long, env = "SEALMINER_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SEALMINER_OUTPUT",
        default_value = "json",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SEALMINER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Key/value table of the top-level fields
    Table,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read or replace the pool configuration
    Pool(PoolArgs),

    /// Show system information
    #[command(alias = "sys")]
    System,

    /// Show network information
    #[command(alias = "net")]
    Network,

    /// Show hashboard / fan / temperature monitor status
    Monitor,

    /// Show the current mining mode
    Mode,

    /// Show the miner type
    #[command(name = "type")]
    MinerType,

    /// Show active error codes
    Errors,

    /// Start or stop hashing
    Mining(MiningArgs),

    /// Reboot the miner
    Reboot,

    /// Send an arbitrary cgi-bin command
    Send(SendArgs),

    /// Send several parameterless commands concurrently
    Batch(BatchArgs),

    /// Log in and report the outcome
    Login,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POOL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PoolArgs {
    #[command(subcommand)]
    pub command: PoolCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoolCommand {
    /// Show the pool configuration
    Get,

    /// Replace the pool configuration from a JSON object
    Set {
        /// JSON file with the pool configuration object
        #[arg(long, short = 'F')]
        from_file: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MINING
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MiningArgs {
    #[command(subcommand)]
    pub command: MiningCommand,
}

#[derive(Debug, Subcommand)]
pub enum MiningCommand {
    /// Start (or resume) hashing
    Start,

    /// Stop hashing
    Stop,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEND / BATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Command name (cgi-bin endpoint without `.php`)
    pub command: String,

    /// Raw payload, posted verbatim as a form body
    #[arg(long, short = 'd', conflicts_with_all = ["param", "from_file"])]
    pub data: Option<String>,

    /// Named parameter (key=value), posted as a JSON body
    #[arg(long, short = 'P', value_name = "KEY=VALUE", conflicts_with = "from_file")]
    pub param: Vec<String>,

    /// JSON file with the parameter object, posted as a JSON body
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Command names to send (defaults to every read-only query)
    pub commands: Vec<String>,

    /// Leave failed commands out instead of failing the batch
    #[arg(long)]
    pub ignore_errors: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Add or replace a miner profile with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// List configured miner profiles
    Profiles,

    /// Set the default miner profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a miner's web password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
