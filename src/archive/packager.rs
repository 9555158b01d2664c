//! ZIP archive assembly.

use std::io::{Cursor, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::Archiver;
use crate::constants::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::error::{Error, Result};
use crate::extract::SegmentArtifact;
use crate::planner::SegmentNaming;

/// How segment payloads are stored in the archive.
///
/// Both are lossless; the archive never re-encodes audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    /// Store bytes as-is.
    Stored,
    /// Deflate each entry.
    #[default]
    Deflate,
}

impl std::fmt::Display for ArchiveCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stored => write!(f, "stored"),
            Self::Deflate => write!(f, "deflate"),
        }
    }
}

/// Builds archives from extracted segments.
#[derive(Debug, Clone, Copy)]
pub struct Packager {
    compression: ArchiveCompression,
    level: i64,
}

impl Default for Packager {
    fn default() -> Self {
        Self::new(ArchiveCompression::default(), DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Packager {
    /// Create a packager. `level` only applies to deflate and is clamped to 0-9.
    pub fn new(compression: ArchiveCompression, level: i64) -> Self {
        Self {
            compression,
            level: level.clamp(0, MAX_COMPRESSION_LEVEL),
        }
    }

    fn file_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);
        match self.compression {
            ArchiveCompression::Stored => options.compression_method(CompressionMethod::Stored),
            ArchiveCompression::Deflate => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.level)),
        }
    }
}

impl Archiver for Packager {
    /// Pack `artifacts` into ZIP bytes.
    ///
    /// Entries are written in the order given, as
    /// `<base>/<artifact name>`, with fixed timestamps so identical input
    /// yields an identical archive.
    fn pack(&self, artifacts: &[SegmentArtifact], naming: &SegmentNaming) -> Result<Vec<u8>> {
        let archive = naming.archive_name();
        let fail = |message: String| Error::Packaging {
            archive: archive.clone(),
            message,
        };

        if artifacts.is_empty() {
            return Err(fail("no segments to package".to_string()));
        }
        if artifacts.windows(2).any(|w| w[0].index >= w[1].index) {
            return Err(fail("segments are not in ascending index order".to_string()));
        }

        let folder = naming.base();
        let dir_options = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .unix_permissions(0o755);
        let file_options = self.file_options();

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory(format!("{folder}/"), dir_options)
            .map_err(|e| fail(e.to_string()))?;

        for artifact in artifacts {
            let entry = format!("{folder}/{}", artifact.name);
            debug!("adding {} ({} bytes)", entry, artifact.bytes.len());
            zip.start_file(entry.as_str(), file_options)
                .map_err(|e| fail(format!("{entry}: {e}")))?;
            zip.write_all(&artifact.bytes)
                .map_err(|e| fail(format!("{entry}: {e}")))?;
        }

        let cursor = zip.finish().map_err(|e| fail(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::planner::SegmentEnd;
    use std::io::Read;
    use zip::ZipArchive;

    fn artifact(index: usize, naming: &SegmentNaming, bytes: &[u8]) -> SegmentArtifact {
        SegmentArtifact {
            index,
            name: naming.segment_name(index),
            start: 0.0,
            end: SegmentEnd::Open,
            bytes: bytes.to_vec(),
        }
    }

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_entries_under_base_folder_in_order() {
        let naming = SegmentNaming::new("song", ".mp3");
        let artifacts = vec![
            artifact(0, &naming, b"zero"),
            artifact(1, &naming, b"one"),
            artifact(2, &naming, b"two"),
        ];

        let bytes = Packager::default().pack(&artifacts, &naming).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "song/",
                "song/song000.mp3",
                "song/song001.mp3",
                "song/song002.mp3"
            ]
        );

        let mut content = Vec::new();
        archive
            .by_name("song/song001.mp3")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"one");
    }

    #[test]
    fn test_stored_is_lossless() {
        let naming = SegmentNaming::new("a", "wav");
        let payload: Vec<u8> = (0..=255).cycle().take(4096).collect();
        let artifacts = vec![artifact(0, &naming, &payload)];

        let bytes = Packager::new(ArchiveCompression::Stored, 0)
            .pack(&artifacts, &naming)
            .unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name("a/a000.wav").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Stored);
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(content, payload);
    }

    #[test]
    fn test_identical_input_identical_archive() {
        let naming = SegmentNaming::new("song", ".mp3");
        let artifacts = vec![artifact(0, &naming, b"aaaa"), artifact(1, &naming, b"bbbb")];
        let packager = Packager::default();
        let first = packager.pack(&artifacts, &naming).unwrap();
        let second = packager.pack(&artifacts, &naming).unwrap();
        assert_eq!(first, second);
        assert_eq!(entry_names(first).len(), 3);
    }

    #[test]
    fn test_empty_artifacts_rejected() {
        let naming = SegmentNaming::new("song", ".mp3");
        let result = Packager::default().pack(&[], &naming);
        assert!(matches!(result, Err(Error::Packaging { .. })));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let naming = SegmentNaming::new("song", ".mp3");
        let artifacts = vec![artifact(1, &naming, b"b"), artifact(0, &naming, b"a")];
        let result = Packager::default().pack(&artifacts, &naming);
        assert!(matches!(result, Err(Error::Packaging { .. })));
    }

    #[test]
    fn test_level_is_clamped() {
        let packager = Packager::new(ArchiveCompression::Deflate, 42);
        assert_eq!(packager.level, MAX_COMPRESSION_LEVEL);
    }
}
