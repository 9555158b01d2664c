//! Progress events emitted by a pipeline run.
//!
//! The pipeline writes into a [`ProgressSink`]; a consumer reads the matching
//! [`ProgressStream`]. Sending never blocks and never fails from the
//! pipeline's point of view, so a slow or absent consumer cannot stall
//! extraction. The stream ends once every sink clone has been dropped, which
//! happens when the run terminates.

use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::pipeline::PipelineState;

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Pipeline state the run is in.
    pub stage: PipelineState,
    /// Human-readable phase label.
    pub phase: String,
    /// 1-based number of the segment being processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
    /// Total number of segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl ProgressEvent {
    /// Event without segment counters.
    pub fn stage(stage: PipelineState, phase: impl Into<String>) -> Self {
        Self {
            stage,
            phase: phase.into(),
            current: None,
            total: None,
        }
    }

    /// Event carrying segment counters.
    pub fn step(
        stage: PipelineState,
        phase: impl Into<String>,
        current: usize,
        total: usize,
    ) -> Self {
        Self {
            stage,
            phase: phase.into(),
            current: Some(current),
            total: Some(total),
        }
    }
}

/// Sending half of a progress channel.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<UnboundedSender<ProgressEvent>>,
}

impl ProgressSink {
    /// Create a connected sink and stream.
    pub fn channel() -> (Self, ProgressStream) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, ProgressStream { rx })
    }

    /// A sink that discards every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Send an event. Dropped silently if nobody is listening.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Receiving half of a progress channel.
///
/// Yields each event once, in emission order, and ends after the run that
/// owns the sink terminates. It cannot be rewound or cloned.
#[derive(Debug)]
pub struct ProgressStream {
    rx: UnboundedReceiver<ProgressEvent>,
}

impl ProgressStream {
    /// Wait for the next event; `None` once the run has finished.
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }

    /// Take every event that is already buffered without waiting.
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order_then_stream_ends() {
        let (sink, mut stream) = ProgressSink::channel();
        sink.emit(ProgressEvent::stage(PipelineState::Planning, "plan"));
        sink.emit(ProgressEvent::step(PipelineState::Extracting, "seg", 1, 2));
        drop(sink);

        assert_eq!(stream.next().await.unwrap().phase, "plan");
        assert_eq!(stream.next().await.unwrap().current, Some(1));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_emit_without_listener_is_silent() {
        let (sink, stream) = ProgressSink::channel();
        drop(stream);
        sink.emit(ProgressEvent::stage(PipelineState::Done, "done"));
        ProgressSink::disabled().emit(ProgressEvent::stage(PipelineState::Done, "done"));
    }

    #[test]
    fn test_drain_collects_buffered() {
        let (sink, mut stream) = ProgressSink::channel();
        for i in 1..=3 {
            sink.emit(ProgressEvent::step(PipelineState::Extracting, "seg", i, 3));
        }
        let events = stream.drain();
        assert_eq!(events.len(), 3);
        assert!(stream.drain().is_empty());
    }

    #[test]
    fn test_serialize_skips_missing_counters() {
        let json =
            serde_json::to_string(&ProgressEvent::stage(PipelineState::Packaging, "pack")).unwrap();
        assert!(!json.contains("current"));
        assert!(json.contains("\"stage\":\"packaging\""));
    }
}
