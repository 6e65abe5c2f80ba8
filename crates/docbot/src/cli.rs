//! Clap derive structures for the `docbot` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// docbot -- operator dashboard for the DocBot conversion service
#[derive(Debug, Parser)]
#[command(
    name = "docbot",
    version,
    about = "Monitor and administer a DocBot service from the command line",
    long_about = "Operator dashboard for the DocBot WhatsApp document service.\n\n\
        Reads statistics, conversion history, analytics and system health\n\
        from the admin API, manages messaging credentials and exports the\n\
        conversion log.",
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
    /// Admin API base URL (overrides the config file)
    #[arg(long, short = 'u', env = "DOCBOT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DOCBOT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "DOCBOT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show aggregate conversion statistics
    #[command(alias = "st")]
    Stats,

    /// List recent conversions (newest first)
    #[command(alias = "conv")]
    Conversions(ConversionsArgs),

    /// Usage, user and error analytics
    #[command(alias = "an")]
    Analytics(AnalyticsArgs),

    /// Show host resource usage of the service
    Health,

    /// Check that the service is alive
    Ping,

    /// View or update messaging credentials
    Settings(SettingsArgs),

    /// Download the conversion log as CSV
    Export(ExportArgs),

    /// Poll a resource and print every update
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Conversions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConversionsArgs {
    /// Only show conversions with this status
    #[arg(long, short = 's')]
    pub status: Option<StatusFilter>,

    /// Show at most this many rows
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Success,
    Failed,
    Pending,
}

// ── Analytics ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Daily conversion counts
    #[command(alias = "ts")]
    Timeseries(DaysArg),

    /// Feature usage breakdown
    Features,

    /// Unique users, top users and countries
    Users,

    /// Error totals, types and recent failures
    Errors,
}

#[derive(Debug, Args)]
pub struct DaysArg {
    /// Window size in days (1-365)
    #[arg(
        long,
        short = 'd',
        default_value = "30",
        value_parser = clap::value_parser!(u32).range(1..=365)
    )]
    pub days: u32,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show stored credentials (the access token is masked by the server)
    Show,

    /// Update credentials; omitted fields keep their stored values
    Set(SettingsSetArgs),
}

#[derive(Debug, Args)]
pub struct SettingsSetArgs {
    /// WhatsApp Business account ID
    #[arg(long)]
    pub business_account_id: Option<String>,

    /// Phone number ID
    #[arg(long)]
    pub phone_number_id: Option<String>,

    /// Permanent access token
    #[arg(long)]
    pub access_token: Option<String>,

    /// Webhook verify token
    #[arg(long)]
    pub webhook_verify_token: Option<String>,

    /// Read the admin password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Export ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory to write the CSV into (overrides the config file)
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Resource to poll
    pub resource: WatchResource,

    /// Window size in days for `timeseries`
    #[arg(
        long,
        short = 'd',
        default_value = "30",
        value_parser = clap::value_parser!(u32).range(1..=365)
    )]
    pub days: u32,

    /// Stop after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Poll period (e.g. "5s", "1m"); defaults to the configured interval
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WatchResource {
    Stats,
    Conversions,
    Timeseries,
    Features,
    Users,
    Errors,
    Health,
    Liveness,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
