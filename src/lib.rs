//! Marksplit - split audio at markers into a segment archive.
//!
//! User-placed markers are planned into contiguous segments, each segment
//! is cut from the source with a stream-copying codec engine, and the
//! results are packaged into one ZIP archive and delivered.

#![warn(missing_docs)]

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod extract;
pub mod markers;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod progress;

use clap::Parser;
use cli::{Cli, Command, MarkerArgs, PlanArgs, SplitArgs};
use config::{Config, config_file_path, load_default_config, save_default_config, validate_config};
use constants::AUDIO_EXTENSIONS;
use delivery::FileDelivery;
use engine::{EngineHandle, FfmpegEngine, FfmpegSettings};
use markers::{MarkerSet, parse_marker_file};
use output::json_envelope::{EventType, PlanPayload, PlannedSegment};
use output::progress::format_timestamp;
use output::{HumanReporter, JsonReporter, ProgressReporter, forward};
use pipeline::{CancelFlag, ExportReport, ExportRequest, export};
use planner::{SegmentEnd, SegmentNaming, plan};
use progress::ProgressSink;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub use error::{Error, ErrorKind, Result};

/// Main entry point for marksplit CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    // Load configuration
    let config = load_default_config()?;

    match cli.command {
        Command::Split(args) => split_file(&args, &config, cli.quiet),
        Command::Plan(args) => plan_segments(&args),
        Command::Config { action } => handle_config_command(action),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // stdout is reserved for results and NDJSON events.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Gather split points from `--at` values and an optional marker file.
fn collect_markers(args: &MarkerArgs) -> Result<MarkerSet> {
    let mut times = args.at.clone();
    if let Some(path) = &args.markers {
        let from_file = parse_marker_file(path)?;
        debug!("read {} marker(s) from {}", from_file.len(), path.display());
        times.extend(from_file);
    }
    MarkerSet::from_times(times)
}

/// Directory the archive goes to when none is configured.
fn output_dir_for(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn warn_if_unusual_extension(input: &Path) {
    let known = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if !known {
        warn!(
            "{} has an unrecognized extension; ffmpeg may not write segments in that format",
            input.display()
        );
    }
}

/// Run the full export for one source file.
fn split_file(args: &SplitArgs, config: &Config, quiet: bool) -> Result<()> {
    validate_config(config)?;

    let markers = collect_markers(&args.markers)?;
    let packager = archive::Packager::new(
        args.compression.unwrap_or(config.defaults.compression),
        args.compression_level
            .unwrap_or(config.defaults.compression_level),
    );
    let request = ExportRequest::new(&args.input, &markers).with_archiver(packager);
    request.validate()?;
    warn_if_unusual_extension(&args.input);

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.defaults.output_dir.clone())
        .unwrap_or_else(|| output_dir_for(&args.input));
    let mut delivery =
        FileDelivery::new(output_dir).with_overwrite(args.force || config.defaults.overwrite);
    let timeout = args.timeout.or(config.pipeline.timeout_secs);

    let reporter: Box<dyn ProgressReporter> = if args.json {
        Box::new(JsonReporter::new())
    } else {
        let source_name = args
            .input
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        let progress_enabled = !quiet && !args.no_progress && config.defaults.progress;
        Box::new(HumanReporter::new(source_name, progress_enabled))
    };

    // Ctrl+C stops the run between segments; a second one exits immediately.
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flag.is_cancelled() {
            std::process::exit(130); // 128 + SIGINT(2)
        }
        warn!("Cancelling after the current segment (press Ctrl+C again to exit)");
        handler_flag.cancel();
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal {
            message: format!("Failed to create async runtime: {e}"),
        })?;

    let settings = FfmpegSettings::from(&config.engine);
    let result = runtime.block_on(async {
        let mut engine = EngineHandle::start(FfmpegEngine::new(settings)).await?;

        let (sink, stream) = ProgressSink::channel();
        let run = export(request, &mut engine, &mut delivery, sink, &cancel);
        let bounded = async {
            match timeout {
                Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
                    .await
                    .unwrap_or(Err(Error::TimedOut { secs })),
                None => run.await,
            }
        };
        let (result, ()) = tokio::join!(bounded, forward(stream, reporter.as_ref()));

        if let Err(e) = engine.shutdown().await {
            warn!("engine shutdown failed: {e}");
        }
        result
    });

    match result {
        Ok(report) => {
            reporter.finished(&report);
            if !args.json && !quiet {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            reporter.failed(&e);
            Err(e)
        }
    }
}

fn print_report(report: &ExportReport) {
    println!(
        "Created {} ({} segments, {} bytes)",
        report.destination.display(),
        report.segments.len(),
        report.archive_bytes
    );
    for segment in &report.segments {
        println!(
            "  {}  {} - {}",
            segment.name,
            format_timestamp(segment.start),
            format_end(segment.end)
        );
    }
}

fn format_end(end: SegmentEnd) -> String {
    end.seconds()
        .map_or_else(|| "end".to_string(), format_timestamp)
}

/// Print the segments a split would produce.
fn plan_segments(args: &PlanArgs) -> Result<()> {
    let markers = collect_markers(&args.markers)?;
    if markers.is_empty() {
        return Err(Error::NoMarkers);
    }

    let naming = SegmentNaming::from_source(&args.input);
    let boundaries = plan(&markers.times(), args.duration);
    if boundaries.len() < 2 {
        return Err(Error::NoUsableMarkers {
            count: markers.len(),
        });
    }

    if args.json {
        let payload = PlanPayload {
            source: args.input.clone(),
            track_duration: args.duration,
            archive_name: naming.archive_name(),
            segments: boundaries
                .iter()
                .map(|b| PlannedSegment::new(b, naming.segment_name(b.index)))
                .collect(),
        };
        JsonReporter::new().emit(EventType::Plan, payload);
        return Ok(());
    }

    println!("{} -> {}", args.input.display(), naming.archive_name());
    for boundary in &boundaries {
        println!(
            "  {}  {} - {}",
            naming.segment_name(boundary.index),
            format_timestamp(boundary.start),
            format_end(boundary.end)
        );
    }
    Ok(())
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let text =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
