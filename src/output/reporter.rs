//! Progress reporting for CLI output.
//!
//! A reporter consumes pipeline progress events and the final outcome and
//! renders them either as progress bars (human) or as NDJSON envelopes.

use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{info, warn};

use crate::constants::phases;
use crate::error::Error;
use crate::output::json_envelope::{CancelledPayload, ErrorPayload, EventType, JsonEnvelope};
use crate::output::progress;
use crate::pipeline::{ExportReport, PipelineState};
use crate::progress::{ProgressEvent, ProgressStream};

/// Receives pipeline progress and the final outcome.
pub trait ProgressReporter: Send + Sync {
    /// Report one progress event.
    fn progress(&self, event: &ProgressEvent);

    /// Report a successful export.
    fn finished(&self, report: &ExportReport);

    /// Report a failed export.
    fn failed(&self, error: &Error);
}

/// Feed every event from `stream` to `reporter` until the run ends.
pub async fn forward(mut stream: ProgressStream, reporter: &dyn ProgressReporter) {
    while let Some(event) = stream.next().await {
        reporter.progress(&event);
    }
}

/// Progress bars on stderr.
pub struct HumanReporter {
    source_name: String,
    enabled: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl HumanReporter {
    /// Create a reporter for `source_name`; `enabled = false` draws no bars.
    pub fn new(source_name: impl Into<String>, enabled: bool) -> Self {
        Self {
            source_name: source_name.into(),
            enabled,
            bar: Mutex::new(None),
        }
    }

    fn take_bar(&self) -> Option<ProgressBar> {
        self.bar.lock().ok().and_then(|mut bar| bar.take())
    }
}

impl ProgressReporter for HumanReporter {
    fn progress(&self, event: &ProgressEvent) {
        match (event.stage, event.current, event.total) {
            (PipelineState::Extracting, Some(current), Some(total)) => {
                if let Ok(mut slot) = self.bar.lock() {
                    if slot.is_none() {
                        *slot = progress::create_segment_progress(
                            total,
                            &self.source_name,
                            self.enabled,
                        );
                    }
                    if let Some(bar) = slot.as_ref() {
                        // Per-segment events arrive before the segment starts.
                        let done = if event.phase == phases::EXTRACTED {
                            total
                        } else {
                            current.saturating_sub(1)
                        };
                        bar.set_position(done as u64);
                        bar.set_message(event.phase.clone());
                    }
                }
            }
            (PipelineState::Done, _, _) => {
                progress::finish_progress(self.take_bar(), &event.phase);
            }
            (PipelineState::Aborted, _, _) => {
                progress::abandon_progress(self.take_bar(), &event.phase);
            }
            (stage, _, _) => {
                let bar = self.bar.lock().ok().and_then(|slot| slot.clone());
                match bar {
                    Some(bar) => bar.set_message(event.phase.clone()),
                    None if !self.enabled => {}
                    None => info!("{} ({stage})", event.phase),
                }
            }
        }
    }

    fn finished(&self, report: &ExportReport) {
        progress::finish_progress(self.take_bar(), "Done!");
        info!(
            "{} segment(s), {} bytes -> {}",
            report.segments.len(),
            report.archive_bytes,
            report.destination.display()
        );
    }

    fn failed(&self, error: &Error) {
        progress::abandon_progress(self.take_bar(), "Aborted");
        warn!("{error}");
    }
}

/// NDJSON envelopes, one per line.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    write_failed: AtomicBool,
}

impl JsonReporter {
    /// Reporter writing to stdout.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Reporter writing to an arbitrary sink.
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            write_failed: AtomicBool::new(false),
        }
    }

    /// Write one envelope.
    pub fn emit<T: Serialize>(&self, event: EventType, payload: T) {
        let envelope = JsonEnvelope::new(event, payload);
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize {event:?} event: {e}");
                return;
            }
        };

        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writeln!(writer, "{json}")
                && !self.write_failed.swap(true, Ordering::Relaxed)
            {
                // Log once; a closed pipe would otherwise repeat this per event.
                warn!("failed to write to stdout: {e} (subsequent errors suppressed)");
            }
            let _ = writer.flush();
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonReporter {
    fn progress(&self, event: &ProgressEvent) {
        self.emit(EventType::Progress, event);
    }

    fn finished(&self, report: &ExportReport) {
        self.emit(EventType::Result, report);
    }

    fn failed(&self, error: &Error) {
        match error {
            Error::Cancelled { completed, total } => self.emit(
                EventType::Cancelled,
                CancelledPayload {
                    completed: *completed,
                    total: *total,
                },
            ),
            other => self.emit(EventType::Error, ErrorPayload::from(other)),
        }
    }
}
