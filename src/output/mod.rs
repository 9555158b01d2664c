//! CLI output: progress bars and JSON envelopes.

pub mod json_envelope;
pub mod progress;
mod reporter;

pub use reporter::{HumanReporter, JsonReporter, ProgressReporter, forward};
