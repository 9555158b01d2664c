//! CLI argument definitions.

use crate::archive::ArchiveCompression;
use crate::cli::validators::{
    parse_compression_level, parse_duration, parse_marker, parse_timeout,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Split audio at markers into a ZIP of losslessly cut segments.
#[derive(Debug, Parser)]
#[command(name = "marksplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a source file and write the segment archive.
    Split(SplitArgs),
    /// Show the segments a split would produce without running ffmpeg.
    Plan(PlanArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Where split points come from.
#[derive(Debug, Clone, Args)]
pub struct MarkerArgs {
    /// Split point (seconds, MM:SS or HH:MM:SS). Repeatable.
    #[arg(long = "at", value_name = "TIME", value_parser = parse_marker)]
    pub at: Vec<f64>,

    /// File with one split point per line, or an Audacity label track.
    #[arg(long, value_name = "FILE", env = "MARKSPLIT_MARKERS")]
    pub markers: Option<PathBuf>,
}

/// Arguments for the split command.
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Source audio file.
    pub input: PathBuf,

    /// Split points.
    #[command(flatten)]
    pub markers: MarkerArgs,

    /// Output directory (default: same as input).
    #[arg(short, long, env = "MARKSPLIT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Archive entry compression.
    #[arg(long, value_enum, env = "MARKSPLIT_COMPRESSION")]
    pub compression: Option<ArchiveCompression>,

    /// Deflate level (0-9).
    #[arg(long, value_parser = parse_compression_level, env = "MARKSPLIT_COMPRESSION_LEVEL")]
    pub compression_level: Option<i64>,

    /// Overwrite an existing archive.
    #[arg(long)]
    pub force: bool,

    /// Emit NDJSON events on stdout instead of progress bars.
    #[arg(long)]
    pub json: bool,

    /// Disable progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Abort the export after this many seconds.
    #[arg(
        long,
        value_name = "SECS",
        value_parser = parse_timeout,
        env = "MARKSPLIT_TIMEOUT"
    )]
    pub timeout: Option<u64>,
}

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Source audio file (used for naming only).
    pub input: PathBuf,

    /// Split points.
    #[command(flatten)]
    pub markers: MarkerArgs,

    /// Known track duration in seconds; markers at or past it are dropped.
    #[arg(long, value_name = "SECS", value_parser = parse_duration)]
    pub duration: Option<f64>,

    /// Print the plan as a JSON envelope.
    #[arg(long)]
    pub json: bool,
}
