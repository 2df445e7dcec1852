//! acapture command-line application library.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use acapture_types::{FrameFormat, TargetKind};

/// List capture targets and grab frames through a capture session.
#[derive(Debug, Parser)]
#[command(name = "acapture", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available capture targets.
    Targets(TargetsArgs),

    /// Reset a session, step it, close it, and summarize the last frame.
    Grab(GrabArgs),
}

/// Arguments for `acapture targets`.
#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Only list targets of this kind.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Only list targets whose label contains this text.
    #[arg(long)]
    pub label: Option<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `acapture grab`.
#[derive(Debug, Args)]
pub struct GrabArgs {
    /// Target id to capture (default: the primary display).
    #[arg(long)]
    pub target: Option<String>,

    /// JSON session config file. Flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output width; requires --height.
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Output height; requires --width.
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Output pixel layout.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Capture rate in frames per second.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Number of steps after reset.
    #[arg(long, default_value_t = 1)]
    pub steps: u32,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Target kind as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Display,
    Window,
}

impl From<KindArg> for TargetKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Display => TargetKind::Display,
            KindArg::Window => TargetKind::Window,
        }
    }
}

/// Pixel layout as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Bgr,
    Rgb,
    Bgra,
}

impl From<FormatArg> for FrameFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Bgr => FrameFormat::Bgr,
            FormatArg::Rgb => FrameFormat::Rgb,
            FormatArg::Bgra => FrameFormat::Bgra,
        }
    }
}

/// Initialize logging.
fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "acapture=info,acapture_lib=info,acapture_env=info,acapture_capture=info".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Parse arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();
    info!("acapture starting");

    match cli.command {
        Command::Targets(args) => commands::targets(&args),
        Command::Grab(args) => commands::grab(&args),
    }
}
