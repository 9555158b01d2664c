//! Segment extraction.
//!
//! Drives a [`CodecEngine`](crate::engine::CodecEngine) over a list of planned
//! boundaries, one segment at a time, and collects the resulting bytes.

mod orchestrator;

pub use crate::engine::ExtractionRequest;
pub use orchestrator::{SegmentArtifact, extract_segments};
