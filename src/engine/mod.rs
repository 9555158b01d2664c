//! Codec engine abstraction.
//!
//! The engine is the external service that cuts a time range out of a
//! source without re-encoding. It owns a private working area: extracted
//! segments land there as named files until the caller reads and deletes
//! them. Engines are stateful and not safe for concurrent use, which is why
//! every method takes `&mut self`.

mod ffmpeg;
mod handle;
mod tool;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::planner::SegmentBoundary;

pub use ffmpeg::{FfmpegEngine, FfmpegSettings};
pub use handle::{EngineHandle, EngineState};
pub use tool::{ToolCommand, ToolOutput};

/// A source loaded into an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHandle {
    /// File name of the source, used in logs.
    pub name: String,
    /// Location of the source on disk.
    pub path: PathBuf,
}

/// One range to extract.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds; `None` extracts to the end of the stream.
    pub end: Option<f64>,
    /// Copy the coded stream as-is instead of re-encoding.
    pub stream_copy: bool,
    /// Name of the file to create in the engine's working area.
    pub output_name: String,
}

impl ExtractionRequest {
    /// Build a lossless stream-copy request for a planned boundary.
    pub fn for_boundary(boundary: &SegmentBoundary, output_name: impl Into<String>) -> Self {
        Self {
            start: boundary.start,
            end: boundary.end.seconds(),
            stream_copy: true,
            output_name: output_name.into(),
        }
    }
}

/// Operations a codec engine must provide.
#[async_trait]
pub trait CodecEngine: Send {
    /// Short identifier used in logs (e.g. `"ffmpeg"`).
    fn name(&self) -> &'static str;

    /// Prepare the engine for use. Called once by [`EngineHandle::init`].
    async fn initialize(&mut self) -> Result<()>;

    /// Make a source available to later calls.
    async fn load_source(&mut self, path: &Path) -> Result<SourceHandle>;

    /// Total duration of the source in seconds, if the engine can tell.
    async fn probe_duration(&mut self, source: &SourceHandle) -> Result<Option<f64>>;

    /// Extract a range into `request.output_name` in the working area.
    ///
    /// On failure the engine must not leave a partial output behind.
    async fn extract(&mut self, source: &SourceHandle, request: &ExtractionRequest) -> Result<()>;

    /// Read a working-area file.
    async fn read_output(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Delete a working-area file. Deleting a missing file is not an error.
    async fn delete_output(&mut self, name: &str) -> Result<()>;

    /// Release a source loaded with [`CodecEngine::load_source`].
    async fn release_source(&mut self, source: SourceHandle) -> Result<()>;

    /// Names of files currently held in the working area.
    fn working_files(&self) -> Vec<String>;

    /// Release every resource held by the engine.
    async fn shutdown(&mut self) -> Result<()>;
}
