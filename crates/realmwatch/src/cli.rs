//! Clap derive structures for the `realmwatch` CLI.
//!
//! Defines the command tree, global flags, and shared types. Also compiled
//! by `build.rs` for man page generation, so it depends on clap only.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// realmwatch -- Wi-Fi realm detection and branding mode monitor
#[derive(Debug, Parser)]
#[command(
    name = "realmwatch",
    version,
    about = "Detect the Wi-Fi realm and decide the branding mode",
    long_about = "Runs the realm probe server and inspects the branding mode decision.\n\n\
        The mode is Branded when a realm matching the brand domain is observed,\n\
        or when the device is on Wi-Fi and the reachability endpoint answers.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "REALMWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REALMWATCH_OUTPUT",
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
    /// Run the realm probe HTTP server
    Serve(ServeArgs),

    /// Probe reachability endpoints once
    Check(CheckArgs),

    /// Fetch the realm from a realm probe server
    Fetch(FetchArgs),

    /// Decide the branding mode once and report it
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Follow branding mode decisions as they change
    Watch(WatchArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT and the config file)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Realm to advertise (overrides REALM and the config file)
    #[arg(long, short = 'r')]
    pub realm: Option<String>,

    /// Address to bind
    #[arg(long)]
    pub bind: Option<String>,
}

// ── Check ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Endpoints to probe (defaults to the configured reachability URL)
    pub urls: Vec<String>,

    /// Probe timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k')]
    pub insecure: bool,
}

// ── Fetch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Realm endpoint (defaults to realm_source.url, then the local server)
    pub url: Option<String>,

    /// Fetch timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k')]
    pub insecure: bool,
}

// ── Status / Watch ───────────────────────────────────────────────────

/// Inputs shared by `status` and `watch`.
#[derive(Debug, Args)]
pub struct DecisionArgs {
    /// Assume the active interface is (true) or is not (false) Wi-Fi
    #[arg(long, value_name = "BOOL")]
    pub wifi: Option<bool>,

    /// Treat this realm as observed
    #[arg(long)]
    pub realm: Option<String>,

    /// Force branded mode through the debug override
    #[arg(long)]
    pub simulate: bool,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub decision: DecisionArgs,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub decision: DecisionArgs,

    /// Poll this realm probe endpoint (overrides realm_source)
    #[arg(long)]
    pub realm_url: Option<String>,

    /// Re-evaluate every N seconds, as if the app came back to the foreground
    #[arg(long, value_name = "SECS")]
    pub reevaluate_secs: Option<u64>,

    /// Exit after N mode changes
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file with guided setup
    Init {
        /// Write defaults without prompting
        #[arg(long)]
        defaults: bool,

        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
