//! Error types for marksplit.

use std::path::PathBuf;

/// Result type alias for marksplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Callers use this to decide how to react to a failed export without
/// matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request rejected before the pipeline started.
    Validation,
    /// The codec engine failed while extracting a segment.
    Extraction,
    /// The archive could not be assembled.
    Packaging,
    /// The finished archive could not be handed off.
    Delivery,
    /// The run was cancelled between segments.
    Cancelled,
    /// Engine lifecycle problem (not ready, tool missing).
    Engine,
    /// Configuration could not be loaded, saved or validated.
    Config,
    /// Other I/O failure.
    Io,
    /// Internal error.
    Internal,
}

/// Top-level error type for marksplit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    // Validation errors
    /// No source audio was supplied or it does not exist.
    #[error("no source audio loaded: '{path}' is not a readable file")]
    SourceNotLoaded {
        /// Path that was supplied.
        path: PathBuf,
    },

    /// Output names would carry no extension, so the container is unknown.
    #[error("'{path}' has no extension, so the segment format cannot be chosen")]
    MissingExtension {
        /// Source path.
        path: PathBuf,
    },

    /// Export was requested without any markers.
    #[error("no markers set: add at least one marker before exporting")]
    NoMarkers,

    /// Every marker fell outside the usable range of the track.
    #[error("no usable markers: all {count} marker(s) lie at the track start or past its end")]
    NoUsableMarkers {
        /// Number of markers supplied.
        count: usize,
    },

    /// A marker time is negative or not a finite number.
    #[error("invalid marker time {value}: must be a finite, non-negative number of seconds")]
    InvalidMarkerTime {
        /// Offending value.
        value: f64,
    },

    /// A marker time string could not be parsed.
    #[error("invalid marker '{input}': {reason}")]
    MarkerParse {
        /// Input text.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Failed to read a marker file.
    #[error("failed to read marker file '{path}'")]
    MarkerFileRead {
        /// Path to the marker file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Marker id does not belong to the set.
    #[error("marker {id} not found")]
    MarkerNotFound {
        /// Missing marker id.
        id: u64,
    },

    // Engine errors
    /// External tool could not be located.
    #[error("required tool '{tool}' not found (install it or set engine.{tool}_path in config)")]
    ToolNotFound {
        /// Tool name.
        tool: String,
    },

    /// Engine failed to initialize.
    #[error("failed to initialize codec engine: {reason}")]
    EngineInit {
        /// Description of the failure.
        reason: String,
    },

    /// Engine used outside the ready state.
    #[error("codec engine is not ready (state: {state})")]
    EngineNotReady {
        /// Current lifecycle state.
        state: String,
    },

    /// Engine call failed outside of a specific segment.
    #[error("codec engine error: {message}")]
    Engine {
        /// Engine diagnostic.
        message: String,
    },

    // Pipeline stage errors
    /// Extraction of a segment failed.
    #[error("failed to extract segment {index} ('{name}'): {message}")]
    Extraction {
        /// Zero-based boundary index.
        index: usize,
        /// Output name of the segment.
        name: String,
        /// Engine diagnostic.
        message: String,
    },

    /// Archive assembly failed.
    #[error("failed to package archive '{archive}': {message}")]
    Packaging {
        /// Archive name.
        archive: String,
        /// Description of the failure.
        message: String,
    },

    /// Archive handoff failed.
    #[error("failed to deliver '{name}' to '{destination}'")]
    Delivery {
        /// Suggested archive file name.
        name: String,
        /// Destination that was attempted.
        destination: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Destination already exists and overwriting is disabled.
    #[error("output file already exists: {path} (use --force to overwrite)")]
    DeliveryExists {
        /// Existing file.
        path: PathBuf,
    },

    /// Run was cancelled.
    #[error("export cancelled after {completed} of {total} segment(s)")]
    Cancelled {
        /// Segments finished before cancellation.
        completed: usize,
        /// Planned segment count.
        total: usize,
    },

    /// Run exceeded the caller-imposed timeout.
    #[error("export timed out after {secs}s")]
    TimedOut {
        /// Timeout in seconds.
        secs: u64,
    },

    /// Failed to serialize structured output.
    #[error("failed to serialize JSON output")]
    JsonSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotLoaded { .. }
            | Self::NoMarkers
            | Self::MissingExtension { .. }
            | Self::NoUsableMarkers { .. }
            | Self::InvalidMarkerTime { .. }
            | Self::MarkerParse { .. }
            | Self::MarkerFileRead { .. }
            | Self::MarkerNotFound { .. } => ErrorKind::Validation,
            Self::Extraction { .. } => ErrorKind::Extraction,
            Self::Packaging { .. } => ErrorKind::Packaging,
            Self::Delivery { .. } | Self::DeliveryExists { .. } => ErrorKind::Delivery,
            Self::Cancelled { .. } | Self::TimedOut { .. } => ErrorKind::Cancelled,
            Self::ToolNotFound { .. }
            | Self::EngineInit { .. }
            | Self::EngineNotReady { .. }
            | Self::Engine { .. } => ErrorKind::Engine,
            Self::ConfigDirNotFound
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::ConfigWrite { .. }
            | Self::ConfigSerialize { .. } => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::JsonSerialize { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}
