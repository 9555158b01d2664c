//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "marksplit";

/// Environment variable that points marksplit at a specific config file.
pub const CONFIG_PATH_ENV: &str = "MARKSPLIT_CONFIG";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Marker times are compared after rounding to this many units per second.
///
/// Two markers that land on the same millisecond collapse into one split point.
pub const MARKER_TICKS_PER_SECOND: f64 = 1000.0;

/// Width of the zero-padded segment ordinal in output file names.
pub const SEGMENT_INDEX_WIDTH: usize = 3;

/// Prefix of temporary files written next to a delivered archive.
pub const DELIVERY_TEMP_PREFIX: &str = ".marksplit-";

/// Suffix appended to the base name to form the suggested archive file name.
pub const ARCHIVE_SUFFIX: &str = "-segments.zip";

/// Base name used when the source path has no usable file stem.
pub const FALLBACK_BASE_NAME: &str = "audio";

/// Default ZIP deflate level (0-9).
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// Maximum ZIP deflate level.
pub const MAX_COMPRESSION_LEVEL: i64 = 9;

/// External tool names.
pub mod tools {
    /// Extraction tool.
    pub const FFMPEG: &str = "ffmpeg";
    /// Duration probe tool.
    pub const FFPROBE: &str = "ffprobe";
}

/// Human-readable phase labels attached to progress events.
pub mod phases {
    /// Label for a run that has not started.
    pub const IDLE: &str = "Idle";
    /// Emitted when segment planning starts.
    pub const PLANNING: &str = "Planning segments";
    /// Emitted when the source is probed for its duration.
    pub const PROBING: &str = "Analyzing audio";
    /// Emitted once the extraction stage begins.
    pub const EXTRACTING: &str = "Extracting segments";
    /// Emitted after the final segment has been extracted.
    pub const EXTRACTED: &str = "Extraction complete";
    /// Emitted when packaging starts.
    pub const PACKAGING: &str = "Packaging archive";
    /// Emitted when the archive is handed off.
    pub const DELIVERING: &str = "Delivering archive";
    /// Emitted on success.
    pub const DONE: &str = "Done!";
    /// Emitted when the run aborts.
    pub const ABORTED: &str = "Aborted";
}

/// Marker file parsing constants.
pub mod marker_file {
    /// Lines starting with this character are comments.
    pub const COMMENT_PREFIX: char = '#';
    /// Field delimiter used by Audacity label tracks.
    pub const AUDACITY_DELIMITER: u8 = b'\t';
}

/// Supported audio file extensions for source validation hints.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "aac", "ogg", "opus"];
