//! Pipeline coordination.
//!
//! A run walks `Idle → Planning → Extracting → Packaging → Delivering →
//! Done`; any failure after `Idle` ends in `Aborted`, with every resource
//! the run allocated released first.

mod cancel;
mod coordinator;
mod state;

pub use cancel::CancelFlag;
pub use coordinator::{ExportReport, ExportRequest, PipelineRun, SegmentSummary, export};
pub use state::PipelineState;
