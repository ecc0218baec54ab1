//! Clap derive structures for the `sensorfeed` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

use sensorfeed_core::{AlertStatus, Channel};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sensorfeed -- watch microphone, distance and motion sensors
#[derive(Debug, Parser)]
#[command(
    name = "sensorfeed",
    version,
    about = "Watch sensor feeds and manage alerts from the command line",
    long_about = "Polls a sensor manager API for microphone, distance and motion\n\
        readings, keeps a bounded newest-first feed per channel, and lets you\n\
        acknowledge or resolve the alerts the service raises.",
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
    /// Deployment profile to use
    #[arg(long, short = 'p', env = "SENSORFEED_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Sensor API base URL (overrides profile)
    #[arg(long, short = 'u', env = "SENSORFEED_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Poll interval in milliseconds (overrides profile)
    #[arg(long, env = "SENSORFEED_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SENSORFEED_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "SENSORFEED_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SENSORFEED_TIMEOUT", global = true)]
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

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChannelArg {
    /// Sound level in decibels
    #[value(alias = "mic")]
    Microphone,
    /// Proximity in centimeters
    #[value(alias = "dist")]
    Distance,
    /// Motion detection
    Motion,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Microphone => Channel::Microphone,
            ChannelArg::Distance => Channel::Distance,
            ChannelArg::Motion => Channel::Motion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Acknowledged,
    Resolved,
}

impl From<StatusArg> for AlertStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => AlertStatus::Active,
            StatusArg::Acknowledged => AlertStatus::Acknowledged,
            StatusArg::Resolved => AlertStatus::Resolved,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    // ━━━ Feeds ━━━
    /// Show the most recent readings of one channel
    #[command(alias = "f")]
    Feed(FeedArgs),

    /// Poll continuously and print readings as they arrive
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Per-channel summary: feed size, watermark, health, open alerts
    #[command(alias = "st")]
    Status,

    // ━━━ Alerts ━━━
    /// List, acknowledge and resolve alerts
    #[command(alias = "a")]
    Alerts(AlertsArgs),

    /// Push notification registration
    Notify(NotifyArgs),

    // ━━━ Local ━━━
    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Feed ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FeedArgs {
    /// Channel to read
    pub channel: ChannelArg,

    /// Show at most this many readings
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Only readings with an id greater than this
    #[arg(long)]
    pub after: Option<u64>,

    /// Only readings past the channel's alert threshold
    #[arg(long)]
    pub alerting: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Channels to watch (default: all)
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub channel: Vec<ChannelArg>,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Do not print alert notifications
    #[arg(long)]
    pub no_notify: bool,
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts across all channels, newest first
    #[command(alias = "ls")]
    List {
        /// Only alerts with this status
        #[arg(long, short = 's')]
        status: Option<StatusArg>,

        /// Only alerts from this channel
        #[arg(long, short = 'c')]
        channel: Option<ChannelArg>,
    },

    /// Print the number of active alerts
    Count,

    /// Acknowledge an active alert
    #[command(alias = "ack")]
    Acknowledge {
        /// Channel the alert belongs to
        channel: ChannelArg,
        /// Alert id
        id: u64,
    },

    /// Resolve an alert
    Resolve {
        /// Channel the alert belongs to
        channel: ChannelArg,
        /// Alert id
        id: u64,
    },
}

// ── Notify ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NotifyArgs {
    #[command(subcommand)]
    pub command: NotifyCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotifyCommand {
    /// Register a push token with the service
    Register {
        /// Push token issued by the notification provider
        token: String,

        /// Platform label sent with the token
        #[arg(long, default_value = std::env::consts::OS)]
        platform: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. "api_url", "capacity", "devices.motion"
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
