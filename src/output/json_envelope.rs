//! JSON envelope types for CLI output.
//!
//! With `--json` every line on stdout is one envelope, so marksplit can be
//! driven by another program that reads progress and results as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{Error, ErrorKind};
use crate::planner::{SegmentBoundary, SegmentEnd};

/// Current spec version for JSON envelope.
pub const SPEC_VERSION: &str = "1.0";

/// JSON envelope wrapping all CLI output events.
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<T> {
    /// API specification version.
    pub spec_version: String,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event: EventType,
    /// Event-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Create a new envelope with the current timestamp.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }
}

/// Event types for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Pipeline progress update.
    Progress,
    /// Planned segments (dry run).
    Plan,
    /// Final export result.
    Result,
    /// Error occurred.
    Error,
    /// Export cancelled.
    Cancelled,
}

/// Error payload for error events.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Suggested action to resolve the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&Error> for ErrorPayload {
    fn from(error: &Error) -> Self {
        let suggestion = match error {
            Error::NoMarkers => Some("pass --at or --markers".to_string()),
            Error::ToolNotFound { tool } => {
                Some(format!("install {tool} or set engine.{tool}_path in config"))
            }
            Error::DeliveryExists { .. } => Some("use --force to overwrite".to_string()),
            _ => None,
        };
        Self {
            kind: error.kind(),
            message: error.to_string(),
            suggestion,
        }
    }
}

/// Payload for `cancelled` events.
#[derive(Debug, Clone, Serialize)]
pub struct CancelledPayload {
    /// Segments extracted before the run stopped.
    pub completed: usize,
    /// Planned segment count.
    pub total: usize,
}

/// One planned segment in a `plan` payload.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedSegment {
    /// Zero-based ordinal.
    pub index: usize,
    /// Output file name.
    pub name: String,
    /// Start time in seconds.
    pub start: f64,
    /// End of the segment.
    pub end: SegmentEnd,
}

impl PlannedSegment {
    /// Pair a boundary with its output name.
    pub fn new(boundary: &SegmentBoundary, name: String) -> Self {
        Self {
            index: boundary.index,
            name,
            start: boundary.start,
            end: boundary.end,
        }
    }
}

/// Payload for `plan` events.
#[derive(Debug, Clone, Serialize)]
pub struct PlanPayload {
    /// Source audio.
    pub source: PathBuf,
    /// Track duration, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_duration: Option<f64>,
    /// Suggested archive name.
    pub archive_name: String,
    /// Planned segments in order.
    pub segments: Vec<PlannedSegment>,
}
