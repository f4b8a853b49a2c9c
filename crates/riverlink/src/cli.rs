//! Clap derive structures for the `riverlink` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// riverlink -- route and inspect an SDVoE BlueRiver matrix
#[derive(Debug, Parser)]
#[command(
    name = "riverlink",
    version,
    about = "Control SDVoE BlueRiver video matrices from the command line",
    long_about = "Talks to the BlueRiver control add-on over its line-based TCP API.\n\n\
        Lists receivers and transmitters, routes sources with verified\n\
        join/leave, and changes receiver display modes and resolutions.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "RIVERLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// BlueRiver API host (overrides profile)
    #[arg(long, short = 'H', env = "RIVERLINK_HOST", global = true)]
    pub host: Option<String>,

    /// BlueRiver API port (overrides profile)
    #[arg(long, env = "RIVERLINK_PORT", global = true)]
    pub port: Option<u16>,

    /// API version sent in the handshake (overrides profile)
    #[arg(long, env = "RIVERLINK_API_VERSION", global = true)]
    pub api_version: Option<String>,

    /// Socket timeout in seconds (overrides profile)
    #[arg(long, env = "RIVERLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RIVERLINK_OUTPUT",
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

/// Receiver output pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    /// Zero-buffer passthrough, output timing follows the source
    Genlock,
    /// Genlocked frame buffer scaled to the chosen resolution
    #[value(name = "genlock_scaling", alias = "genlock-scaling")]
    GenlockScaling,
    /// Frame buffer at a fixed resolution, letterboxed
    Fastswitch,
    /// Fastswitch, stretched to fill
    #[value(name = "fastswitch_stretch", alias = "fastswitch-stretch")]
    FastswitchStretch,
    /// Fastswitch, cropped to fill
    #[value(name = "fastswitch_crop", alias = "fastswitch-crop")]
    FastswitchCrop,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect every device the API server knows about
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Inspect receivers (decoders driving displays)
    #[command(alias = "rx")]
    Receivers(ReceiversArgs),

    /// Inspect transmitters (encoders fed by sources)
    #[command(alias = "tx")]
    Transmitters(TransmittersArgs),

    /// Route a transmitter to a receiver, or clear a receiver
    #[command(alias = "r")]
    Route(RouteArgs),

    /// Change a receiver's display mode
    Mode(ModeArgs),

    /// List or apply resolution presets
    Preset(PresetArgs),

    /// Start or stop a transmitter stream
    Stream(StreamArgs),

    /// Follow route and display changes until interrupted
    Watch,

    /// Send a raw command line and print the JSON reply
    Raw(RawArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List receivers and transmitters together
    #[command(alias = "ls")]
    List,

    /// Show one device by id or name
    Get {
        /// Device id or name
        device: String,
    },

    /// Print the full JSON state the API reports for a device
    State {
        /// Device id
        device: String,
    },
}

// ── Receivers / Transmitters ─────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReceiversArgs {
    #[command(subcommand)]
    pub command: ReceiversCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReceiversCommand {
    /// List receivers with their current source and display mode
    #[command(alias = "ls")]
    List,

    /// Show one receiver by id or name
    Get {
        /// Receiver id or name
        receiver: String,
    },
}

#[derive(Debug, Args)]
pub struct TransmittersArgs {
    #[command(subcommand)]
    pub command: TransmittersCommand,
}

#[derive(Debug, Subcommand)]
pub enum TransmittersCommand {
    /// List transmitters with their HDMI stream state
    #[command(alias = "ls")]
    List,

    /// Show one transmitter by id or name
    Get {
        /// Transmitter id or name
        transmitter: String,
    },
}

// ── Routing ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RouteArgs {
    #[command(subcommand)]
    pub command: RouteCommand,
}

#[derive(Debug, Subcommand)]
pub enum RouteCommand {
    /// Send a transmitter's video and audio to a receiver
    Set {
        /// Receiver id or name
        receiver: String,
        /// Transmitter id or name
        transmitter: String,
    },

    /// Disconnect a receiver from its source
    Clear {
        /// Receiver id or name
        receiver: String,
    },
}

// ── Display ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ModeArgs {
    #[command(subcommand)]
    pub command: ModeCommand,
}

#[derive(Debug, Subcommand)]
pub enum ModeCommand {
    /// Switch a receiver to another display mode
    Set {
        /// Receiver id or name
        receiver: String,
        /// Display mode
        mode: DisplayMode,
        /// Resolution preset to apply with a scaling mode
        #[arg(long)]
        preset: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct PresetArgs {
    #[command(subcommand)]
    pub command: PresetCommand,
}

#[derive(Debug, Subcommand)]
pub enum PresetCommand {
    /// List the named resolution presets
    #[command(alias = "ls")]
    List,

    /// Apply a preset to a receiver in a scaling mode
    Set {
        /// Receiver id or name
        receiver: String,
        /// Preset name, e.g. "1080p @ 60Hz" or "1280x1024 @ 60Hz"
        preset: String,
    },
}

// ── Streams ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StreamArgs {
    #[command(subcommand)]
    pub command: StreamCommand,
}

#[derive(Debug, Subcommand)]
pub enum StreamCommand {
    /// Start a transmitter stream
    Start(StreamTarget),

    /// Stop a transmitter stream
    Stop(StreamTarget),
}

#[derive(Debug, Args)]
pub struct StreamTarget {
    /// Transmitter id or name
    pub transmitter: String,

    /// Stream type (HDMI, HDMI_AUDIO, ...)
    #[arg(long = "type", short = 't', default_value = "HDMI")]
    pub stream_type: String,

    /// Stream index
    #[arg(long, short = 'i', default_value = "0")]
    pub index: u32,
}

// ── Raw ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RawArgs {
    /// Command line, e.g. `get all device`
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub line: Vec<String>,
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
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
