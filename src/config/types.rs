//! Configuration type definitions.

use crate::archive::ArchiveCompression;
use crate::constants::DEFAULT_COMPRESSION_LEVEL;
use crate::engine::FfmpegSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default export settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External tool locations.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Run limits.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Default export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Directory archives are written to (None = next to the source).
    pub output_dir: Option<PathBuf>,

    /// Archive entry compression.
    pub compression: ArchiveCompression,

    /// Deflate level, 0-9.
    pub compression_level: i64,

    /// Replace an existing archive.
    pub overwrite: bool,

    /// Show progress bars.
    pub progress: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            compression: ArchiveCompression::default(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            overwrite: false,
            progress: true,
        }
    }
}

/// External tool locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to `ffmpeg` (searched on `PATH` when unset).
    pub ffmpeg_path: Option<PathBuf>,

    /// Path to `ffprobe` (searched on `PATH` when unset).
    pub ffprobe_path: Option<PathBuf>,
}

impl From<&EngineConfig> for FfmpegSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }
}

/// Run limits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Abort an export that runs longer than this many seconds.
    pub timeout_secs: Option<u64>,
}
