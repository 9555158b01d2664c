//! Export coordination: plan, extract, package, deliver.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{CancelFlag, PipelineState};
use crate::archive::{Archiver, Packager};
use crate::constants::phases;
use crate::delivery::Delivery;
use crate::engine::{CodecEngine, EngineHandle, SourceHandle};
use crate::error::{Error, Result};
use crate::extract::{SegmentArtifact, extract_segments};
use crate::markers::{MarkerSet, MarkerSnapshot};
use crate::planner::{SegmentBoundary, SegmentEnd, SegmentNaming, plan};
use crate::progress::{ProgressEvent, ProgressSink};

/// What to export.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    source: PathBuf,
    markers: MarkerSnapshot,
    naming: Option<SegmentNaming>,
    archiver: Arc<dyn Archiver>,
}

impl ExportRequest {
    /// Export `source` split at the current contents of `markers`.
    pub fn new(source: impl Into<PathBuf>, markers: &MarkerSet) -> Self {
        Self::from_snapshot(source, markers.snapshot())
    }

    /// Export `source` split at an existing snapshot.
    pub fn from_snapshot(source: impl Into<PathBuf>, markers: MarkerSnapshot) -> Self {
        Self {
            source: source.into(),
            markers,
            naming: None,
            archiver: Arc::new(Packager::default()),
        }
    }

    /// Package segments with `archiver` instead of a default [`Packager`].
    #[must_use]
    pub fn with_archiver(mut self, archiver: impl Archiver + 'static) -> Self {
        self.archiver = Arc::new(archiver);
        self
    }

    /// Override the names derived from the source path.
    #[must_use]
    pub fn with_naming(mut self, naming: SegmentNaming) -> Self {
        self.naming = Some(naming);
        self
    }

    /// Source audio path.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Marker times captured for this export.
    pub fn markers(&self) -> &MarkerSnapshot {
        &self.markers
    }

    /// Naming used for segments and the archive.
    pub fn naming(&self) -> SegmentNaming {
        self.naming
            .clone()
            .unwrap_or_else(|| SegmentNaming::from_source(&self.source))
    }

    /// Check preconditions for starting a run.
    pub fn validate(&self) -> Result<()> {
        if !self.source.is_file() {
            return Err(Error::SourceNotLoaded {
                path: self.source.clone(),
            });
        }
        if self.markers.is_empty() {
            return Err(Error::NoMarkers);
        }
        // ffmpeg picks the segment container from the output extension.
        if self.naming().extension().is_empty() {
            return Err(Error::MissingExtension {
                path: self.source.clone(),
            });
        }
        Ok(())
    }
}

/// One delivered segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    /// Zero-based ordinal.
    pub index: usize,
    /// File name inside the archive.
    pub name: String,
    /// Start time in seconds.
    pub start: f64,
    /// End of the segment.
    pub end: SegmentEnd,
    /// Payload size.
    pub bytes: usize,
}

impl From<&SegmentArtifact> for SegmentSummary {
    fn from(artifact: &SegmentArtifact) -> Self {
        Self {
            index: artifact.index,
            name: artifact.name.clone(),
            start: artifact.start,
            end: artifact.end,
            bytes: artifact.bytes.len(),
        }
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportReport {
    /// Suggested archive file name.
    pub archive_name: String,
    /// Where delivery put the archive.
    pub destination: PathBuf,
    /// Track duration reported by the engine, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_duration: Option<f64>,
    /// Segments in archive order.
    pub segments: Vec<SegmentSummary>,
    /// Archive size.
    pub archive_bytes: usize,
    /// Wall time of the run.
    pub elapsed_secs: f64,
}

/// A single export from start to terminal state.
///
/// Created per export and consumed by [`PipelineRun::execute`], so nothing
/// it allocates outlives the invocation.
#[derive(Debug)]
pub struct PipelineRun {
    request: ExportRequest,
    naming: SegmentNaming,
    state: PipelineState,
    track_duration: Option<f64>,
    boundaries: Vec<SegmentBoundary>,
    segments: Vec<SegmentSummary>,
    progress: ProgressSink,
    started: Instant,
}

impl PipelineRun {
    /// Validate `request` and create an idle run.
    ///
    /// Validation failures are returned here, before the run exists.
    pub fn new(request: ExportRequest, progress: ProgressSink) -> Result<Self> {
        request.validate()?;
        let naming = request.naming();
        Ok(Self {
            request,
            naming,
            state: PipelineState::Idle,
            track_duration: None,
            boundaries: Vec::new(),
            segments: Vec::new(),
            progress,
            started: Instant::now(),
        })
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Drive the run to `Done` or `Aborted`.
    ///
    /// The handle is borrowed mutably for the whole run, so a second run
    /// against the same engine has to wait until this one has finished.
    /// On failure every working file left in the engine is deleted and the
    /// error is returned as it was raised.
    pub async fn execute<E, D>(
        mut self,
        engine: &mut EngineHandle<E>,
        delivery: &mut D,
        cancel: &CancelFlag,
    ) -> Result<ExportReport>
    where
        E: CodecEngine,
        D: Delivery + ?Sized,
    {
        let engine = engine.engine_mut()?;

        self.transition(PipelineState::Planning)?;
        info!(
            "Exporting {} at {} marker(s)",
            self.request.source().display(),
            self.request.markers().len()
        );

        match self.run_stages(engine, delivery, cancel).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.abort(engine, &e).await;
                Err(e)
            }
        }
    }

    async fn run_stages<E, D>(
        &mut self,
        engine: &mut E,
        delivery: &mut D,
        cancel: &CancelFlag,
    ) -> Result<ExportReport>
    where
        E: CodecEngine + ?Sized,
        D: Delivery + ?Sized,
    {
        delivery.preflight(&self.naming.archive_name())?;

        let source = engine.load_source(self.request.source()).await?;
        let archive = self.build_archive(engine, &source, cancel).await;
        if let Err(e) = engine.release_source(source).await {
            warn!("failed to release source: {e}");
        }
        let archive = archive?;

        self.check_cancelled(cancel)?;
        self.transition(PipelineState::Delivering)?;

        let archive_name = self.naming.archive_name();
        let archive_bytes = archive.len();
        let destination = delivery.deliver(archive, &archive_name).await?;

        self.transition(PipelineState::Done)?;
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        info!(
            "Exported {} segment(s) to {} in {:.2}s",
            self.segments.len(),
            destination.display(),
            elapsed_secs
        );

        Ok(ExportReport {
            archive_name,
            destination,
            track_duration: self.track_duration,
            segments: std::mem::take(&mut self.segments),
            archive_bytes,
            elapsed_secs,
        })
    }

    /// Planning, extraction and packaging; returns the archive bytes.
    async fn build_archive<E>(
        &mut self,
        engine: &mut E,
        source: &SourceHandle,
        cancel: &CancelFlag,
    ) -> Result<Vec<u8>>
    where
        E: CodecEngine + ?Sized,
    {
        self.progress
            .emit(ProgressEvent::stage(PipelineState::Planning, phases::PROBING));
        self.track_duration = engine.probe_duration(source).await?;
        match self.track_duration {
            Some(d) => debug!("track duration {d:.3}s"),
            None => debug!("track duration unknown"),
        }

        self.boundaries = plan(self.request.markers().times(), self.track_duration);
        if self.boundaries.len() < 2 {
            return Err(Error::NoUsableMarkers {
                count: self.request.markers().len(),
            });
        }
        info!("Planned {} segment(s)", self.boundaries.len());

        self.check_cancelled(cancel)?;
        self.transition(PipelineState::Extracting)?;
        let artifacts = extract_segments(
            engine,
            source,
            &self.boundaries,
            &self.naming,
            &self.progress,
            cancel,
        )
        .await?;
        self.segments = artifacts.iter().map(SegmentSummary::from).collect();

        self.check_cancelled(cancel)?;
        self.transition(PipelineState::Packaging)?;
        let archiver = Arc::clone(&self.request.archiver);
        let naming = self.naming.clone();
        let archive = tokio::task::spawn_blocking(move || archiver.pack(&artifacts, &naming))
            .await
            .map_err(|e| Error::Packaging {
                archive: self.naming.archive_name(),
                message: format!("packaging task failed: {e}"),
            })??;
        debug!("archive is {} bytes", archive.len());

        Ok(archive)
    }

    fn check_cancelled(&self, cancel: &CancelFlag) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                completed: self.segments.len(),
                total: self.boundaries.len(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: PipelineState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::Internal {
                message: format!("illegal pipeline transition {} -> {next}", self.state),
            });
        }
        debug!("pipeline {} -> {next}", self.state);
        self.state = next;
        self.progress.emit(ProgressEvent::stage(next, next.label()));
        Ok(())
    }

    /// Release everything the run still holds and enter `Aborted`.
    async fn abort<E>(&mut self, engine: &mut E, error: &Error)
    where
        E: CodecEngine + ?Sized,
    {
        for name in engine.working_files() {
            if let Err(e) = engine.delete_output(&name).await {
                warn!("failed to remove working file {name}: {e}");
            }
        }
        self.segments.clear();

        warn!("Export aborted during {}: {error}", self.state);
        if let Err(e) = self.transition(PipelineState::Aborted) {
            debug!("{e}");
        }
    }
}

/// Run one export.
///
/// Validates `request`, then drives a fresh [`PipelineRun`] against
/// `engine`. Progress goes to `progress`; cancellation is observed between
/// segments and stages.
pub async fn export<E, D>(
    request: ExportRequest,
    engine: &mut EngineHandle<E>,
    delivery: &mut D,
    progress: ProgressSink,
    cancel: &CancelFlag,
) -> Result<ExportReport>
where
    E: CodecEngine,
    D: Delivery + ?Sized,
{
    PipelineRun::new(request, progress)?
        .execute(engine, delivery, cancel)
        .await
}
