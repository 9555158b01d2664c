//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use marksplit::archive::Archiver;
use marksplit::delivery::Delivery;
use marksplit::engine::{CodecEngine, ExtractionRequest, SourceHandle};
use marksplit::extract::SegmentArtifact;
use marksplit::pipeline::CancelFlag;
use marksplit::planner::SegmentNaming;
use marksplit::{Error, Result};
use tempfile::TempDir;

/// In-memory engine with scripted behaviour.
///
/// Each extraction writes `"<source>|<start>|<end>"` into a named working
/// file, so archive contents can be checked without real audio.
#[derive(Default)]
pub struct ScriptedEngine {
    /// Duration reported by `probe_duration`.
    pub duration: Option<f64>,
    /// Fail the extraction with this zero-based call number.
    pub fail_on_call: Option<usize>,
    /// Set this flag once this many extractions have completed.
    pub cancel_after: Option<(usize, CancelFlag)>,
    /// Every extraction request, in order, with the source it was for.
    pub calls: Vec<(String, ExtractionRequest)>,
    /// Working area.
    pub working: BTreeMap<String, Vec<u8>>,
    /// Largest number of working files held at once.
    pub peak_working: usize,
    /// Sources loaded and not yet released.
    pub loaded: usize,
    /// Whether `initialize` ran.
    pub initialized: bool,
    /// Whether `shutdown` ran.
    pub shut_down: bool,
}

impl ScriptedEngine {
    pub fn with_duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn cancelling_after(mut self, completed: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((completed, flag));
        self
    }
}

pub fn payload(source: &str, request: &ExtractionRequest) -> Vec<u8> {
    let end = request
        .end
        .map_or_else(|| "open".to_string(), |e| format!("{e:.3}"));
    format!("{source}|{:.3}|{end}", request.start).into_bytes()
}

#[async_trait]
impl CodecEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    async fn load_source(&mut self, path: &Path) -> Result<SourceHandle> {
        if !path.is_file() {
            return Err(Error::Engine {
                message: format!("cannot open {}", path.display()),
            });
        }
        self.loaded += 1;
        Ok(SourceHandle {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path: path.to_path_buf(),
        })
    }

    async fn probe_duration(&mut self, _source: &SourceHandle) -> Result<Option<f64>> {
        Ok(self.duration)
    }

    async fn extract(&mut self, source: &SourceHandle, request: &ExtractionRequest) -> Result<()> {
        let call = self.calls.len();
        self.calls.push((source.name.clone(), request.clone()));

        if self.fail_on_call == Some(call) {
            // Leave a partial file behind to check that the caller discards it.
            self.working
                .insert(request.output_name.clone(), b"partial".to_vec());
            return Err(Error::Engine {
                message: "invalid range".to_string(),
            });
        }

        self.working
            .insert(request.output_name.clone(), payload(&source.name, request));
        self.peak_working = self.peak_working.max(self.working.len());

        if let Some((after, flag)) = &self.cancel_after
            && self.calls.len() >= *after
        {
            flag.cancel();
        }
        Ok(())
    }

    async fn read_output(&mut self, name: &str) -> Result<Vec<u8>> {
        self.working.get(name).cloned().ok_or_else(|| Error::Engine {
            message: format!("{name} not found"),
        })
    }

    async fn delete_output(&mut self, name: &str) -> Result<()> {
        self.working.remove(name);
        Ok(())
    }

    async fn release_source(&mut self, _source: SourceHandle) -> Result<()> {
        self.loaded -= 1;
        Ok(())
    }

    fn working_files(&self) -> Vec<String> {
        self.working.keys().cloned().collect()
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.working.clear();
        self.shut_down = true;
        Ok(())
    }
}

/// Keeps delivered archives in memory.
#[derive(Default)]
pub struct MemoryDelivery {
    pub delivered: Vec<(String, Vec<u8>)>,
    pub fail: bool,
}

#[async_trait]
impl Delivery for MemoryDelivery {
    async fn deliver(&mut self, archive: Vec<u8>, suggested_name: &str) -> Result<PathBuf> {
        if self.fail {
            return Err(Error::Delivery {
                name: suggested_name.to_string(),
                destination: PathBuf::from("memory"),
                source: std::io::Error::other("disk full"),
            });
        }
        self.delivered.push((suggested_name.to_string(), archive));
        Ok(PathBuf::from(suggested_name))
    }
}

/// Archiver that rejects every archive.
#[derive(Debug)]
pub struct FailingArchiver;

impl Archiver for FailingArchiver {
    fn pack(&self, artifacts: &[SegmentArtifact], naming: &SegmentNaming) -> Result<Vec<u8>> {
        Err(Error::Packaging {
            archive: naming.archive_name(),
            message: format!("no space for {} segment(s)", artifacts.len()),
        })
    }
}

/// A temp dir holding a dummy source file.
pub fn source_file(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, b"not really audio").unwrap();
    (dir, path)
}

/// `(entry name, content)` pairs of a ZIP archive, in archive order.
pub fn zip_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}
