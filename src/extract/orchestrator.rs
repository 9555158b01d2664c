//! Sequential extraction of planned segments.

use tracing::{debug, warn};

use crate::constants::phases;
use crate::engine::{CodecEngine, ExtractionRequest, SourceHandle};
use crate::error::{Error, Result};
use crate::pipeline::{CancelFlag, PipelineState};
use crate::planner::{SegmentBoundary, SegmentEnd, SegmentNaming};
use crate::progress::{ProgressEvent, ProgressSink};

/// One extracted segment, ready for packaging.
#[derive(Clone, PartialEq)]
pub struct SegmentArtifact {
    /// Boundary index this artifact was cut from.
    pub index: usize,
    /// File name inside the archive.
    pub name: String,
    /// Start time in seconds.
    pub start: f64,
    /// End of the segment.
    pub end: SegmentEnd,
    /// Extracted payload.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SegmentArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentArtifact")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Extract every boundary from `source`, in index order.
///
/// A progress event is emitted before each segment and once after the last.
/// Each segment's working file is deleted as soon as its bytes are read, so
/// the engine holds at most one segment at a time. The first failure aborts
/// the whole extraction: that segment's working file is discarded, the
/// artifacts collected so far are dropped, and an [`Error::Extraction`] is
/// returned. Cancellation is checked between segments.
pub async fn extract_segments<E>(
    engine: &mut E,
    source: &SourceHandle,
    boundaries: &[SegmentBoundary],
    naming: &SegmentNaming,
    progress: &ProgressSink,
    cancel: &CancelFlag,
) -> Result<Vec<SegmentArtifact>>
where
    E: CodecEngine + ?Sized,
{
    if boundaries.windows(2).any(|w| w[0].index >= w[1].index) {
        return Err(Error::Internal {
            message: "segment boundaries are not in ascending index order".to_string(),
        });
    }

    let total = boundaries.len();
    let mut artifacts = Vec::with_capacity(total);

    for (position, boundary) in boundaries.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                completed: artifacts.len(),
                total,
            });
        }

        let current = position + 1;
        progress.emit(ProgressEvent::step(
            PipelineState::Extracting,
            format!("Processing segment {current}/{total}..."),
            current,
            total,
        ));

        let name = naming.segment_name(boundary.index);
        let request = ExtractionRequest::for_boundary(boundary, name.clone());
        debug!(
            "extracting {} [{:.3}s, {}) from {}",
            name,
            request.start,
            request
                .end
                .map_or_else(|| "end".to_string(), |e| format!("{e:.3}s")),
            source.name
        );

        let bytes = match extract_one(engine, source, &request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                discard(engine, &name).await;
                return Err(Error::Extraction {
                    index: boundary.index,
                    name,
                    message: e.to_string(),
                });
            }
        };

        artifacts.push(SegmentArtifact {
            index: boundary.index,
            name,
            start: boundary.start,
            end: boundary.end,
            bytes,
        });
    }

    progress.emit(ProgressEvent::step(
        PipelineState::Extracting,
        phases::EXTRACTED,
        total,
        total,
    ));

    Ok(artifacts)
}

/// Run one extraction, read the result and delete the working file.
async fn extract_one<E>(
    engine: &mut E,
    source: &SourceHandle,
    request: &ExtractionRequest,
) -> Result<Vec<u8>>
where
    E: CodecEngine + ?Sized,
{
    engine.extract(source, request).await?;
    let bytes = engine.read_output(&request.output_name).await?;
    engine.delete_output(&request.output_name).await?;
    Ok(bytes)
}

async fn discard<E>(engine: &mut E, name: &str)
where
    E: CodecEngine + ?Sized,
{
    if let Err(e) = engine.delete_output(name).await {
        warn!("failed to discard working file {name}: {e}");
    }
}
