//! Engine backed by the `ffmpeg` and `ffprobe` command-line tools.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{debug, warn};

use super::tool::ToolCommand;
use super::{CodecEngine, ExtractionRequest, SourceHandle};
use crate::constants::{APP_NAME, tools};
use crate::error::{Error, Result};

/// Where to find the external tools.
#[derive(Debug, Clone, Default)]
pub struct FfmpegSettings {
    /// Explicit `ffmpeg` binary; searched on `PATH` when `None`.
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit `ffprobe` binary; searched on `PATH` when `None`.
    pub ffprobe_path: Option<PathBuf>,
}

/// Codec engine that shells out to `ffmpeg`.
///
/// Segments are written into a private temporary directory that is removed
/// on shutdown (or when the engine is dropped).
pub struct FfmpegEngine {
    settings: FfmpegSettings,
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
    workdir: Option<TempDir>,
    outputs: BTreeSet<String>,
}

impl FfmpegEngine {
    /// Create an engine; nothing is resolved until initialization.
    pub fn new(settings: FfmpegSettings) -> Self {
        Self {
            settings,
            ffmpeg: None,
            ffprobe: None,
            workdir: None,
            outputs: BTreeSet::new(),
        }
    }

    /// Directory holding in-flight segment files, once initialized.
    pub fn working_dir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }

    fn ffmpeg(&self) -> Result<&Path> {
        self.ffmpeg.as_deref().ok_or_else(|| Error::EngineNotReady {
            state: "uninitialized".to_string(),
        })
    }

    fn output_path(&self, name: &str) -> Result<PathBuf> {
        let dir = self.working_dir().ok_or_else(|| Error::EngineNotReady {
            state: "uninitialized".to_string(),
        })?;
        Ok(dir.join(name))
    }
}

/// Build the argument list for one extraction.
fn extraction_args(input: &Path, request: &ExtractionRequest, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-ss".into(),
        format_seconds(request.start),
    ];

    if let Some(end) = request.end {
        args.push("-to".into());
        args.push(format_seconds(end));
    }

    args.extend(["-map".into(), "0:a".into()]);
    if request.stream_copy {
        args.extend(["-c".into(), "copy".into()]);
    }
    args.push(output.to_string_lossy().into_owned());
    args
}

fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}")
}

fn resolve_tool(explicit: Option<&PathBuf>, name: &str) -> Option<PathBuf> {
    explicit.cloned().or_else(|| which::which(name).ok())
}

#[async_trait]
impl CodecEngine for FfmpegEngine {
    fn name(&self) -> &'static str {
        tools::FFMPEG
    }

    async fn initialize(&mut self) -> Result<()> {
        let ffmpeg = resolve_tool(self.settings.ffmpeg_path.as_ref(), tools::FFMPEG).ok_or_else(
            || Error::ToolNotFound {
                tool: tools::FFMPEG.to_string(),
            },
        )?;

        let version = ToolCommand::new(&ffmpeg)
            .arg("-version")
            .execute()
            .await
            .map_err(|e| match e {
                Error::ToolNotFound { .. } => e,
                other => Error::EngineInit {
                    reason: other.to_string(),
                },
            })?;
        debug!(
            "using {}: {}",
            ffmpeg.display(),
            version.stdout.lines().next().unwrap_or_default()
        );

        self.ffprobe = resolve_tool(self.settings.ffprobe_path.as_ref(), tools::FFPROBE);
        if self.ffprobe.is_none() {
            debug!("ffprobe not found; track duration will be unknown");
        }

        let workdir = tempfile::Builder::new()
            .prefix(&format!("{APP_NAME}-"))
            .tempdir()
            .map_err(|e| Error::EngineInit {
                reason: format!("failed to create working directory: {e}"),
            })?;
        debug!("engine working area: {}", workdir.path().display());

        self.ffmpeg = Some(ffmpeg);
        self.workdir = Some(workdir);
        Ok(())
    }

    async fn load_source(&mut self, path: &Path) -> Result<SourceHandle> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| Error::Engine {
            message: format!("cannot read source '{}': {e}", path.display()),
        })?;
        if !metadata.is_file() {
            return Err(Error::Engine {
                message: format!("source '{}' is not a file", path.display()),
            });
        }

        Ok(SourceHandle {
            name: path
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned()),
            path: path.to_path_buf(),
        })
    }

    async fn probe_duration(&mut self, source: &SourceHandle) -> Result<Option<f64>> {
        let Some(ffprobe) = self.ffprobe.as_ref() else {
            return Ok(None);
        };

        let output = ToolCommand::new(ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .path_arg(&source.path)
            .execute()
            .await;

        match output {
            Ok(out) => Ok(out
                .stdout
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d > 0.0)),
            Err(e) => {
                warn!("could not probe duration of {}: {e}", source.name);
                Ok(None)
            }
        }
    }

    async fn extract(&mut self, source: &SourceHandle, request: &ExtractionRequest) -> Result<()> {
        let output = self.output_path(&request.output_name)?;
        let args = extraction_args(&source.path, request, &output);

        let result = ToolCommand::new(self.ffmpeg()?).args(args).execute().await;

        match result {
            Ok(_) => {
                self.outputs.insert(request.output_name.clone());
                Ok(())
            }
            Err(e) => {
                // ffmpeg may have created the file before failing.
                if let Err(rm) = tokio::fs::remove_file(&output).await
                    && rm.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("failed to remove partial output {}: {rm}", output.display());
                }
                Err(e)
            }
        }
    }

    async fn read_output(&mut self, name: &str) -> Result<Vec<u8>> {
        let path = self.output_path(name)?;
        tokio::fs::read(&path).await.map_err(|e| Error::Engine {
            message: format!("failed to read '{name}' from working area: {e}"),
        })
    }

    async fn delete_output(&mut self, name: &str) -> Result<()> {
        let path = self.output_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Engine {
                    message: format!("failed to delete '{name}' from working area: {e}"),
                });
            }
        }
        self.outputs.remove(name);
        Ok(())
    }

    async fn release_source(&mut self, source: SourceHandle) -> Result<()> {
        // Sources are read in place; nothing was copied into the working area.
        debug!("released source {}", source.name);
        Ok(())
    }

    fn working_files(&self) -> Vec<String> {
        self.outputs.iter().cloned().collect()
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.outputs.clear();
        if let Some(dir) = self.workdir.take() {
            dir.close()?;
        }
        Ok(())
    }
}
