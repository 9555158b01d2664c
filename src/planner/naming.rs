//! Output file naming.

use std::path::Path;

use crate::constants::{ARCHIVE_SUFFIX, FALLBACK_BASE_NAME, SEGMENT_INDEX_WIDTH};

/// Naming scheme for the files produced from one source.
///
/// Segment `i` becomes `<base><i zero-padded to 3><extension>`, so a plain
/// lexicographic sort of the names is also their temporal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentNaming {
    base: String,
    extension: String,
}

impl SegmentNaming {
    /// Create a scheme from a base name and an extension (`".mp3"` or `"mp3"`).
    pub fn new(base: impl Into<String>, extension: impl AsRef<str>) -> Self {
        let ext = extension.as_ref();
        let extension = if ext.is_empty() || ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{ext}")
        };
        Self {
            base: sanitize_base(&base.into()),
            extension,
        }
    }

    /// Derive the scheme from a source path: file stem plus original extension.
    ///
    /// Stream copy keeps the source container, so the extension carries over.
    pub fn from_source(path: &Path) -> Self {
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(base, extension)
    }

    /// Base name without extension; also the archive's top-level folder.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Extension including the leading dot, or empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File name for the segment at `index`.
    pub fn segment_name(&self, index: usize) -> String {
        format!(
            "{base}{index:0width$}{ext}",
            base = self.base,
            index = index,
            ext = self.extension,
            width = SEGMENT_INDEX_WIDTH
        )
    }

    /// Suggested file name for the finished archive.
    pub fn archive_name(&self) -> String {
        format!("{}{ARCHIVE_SUFFIX}", self.base)
    }
}

/// Strip path separators so names stay inside the archive folder.
fn sanitize_base(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    sanitized.replace("..", "__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_names_zero_padded_from_zero() {
        let naming = SegmentNaming::new("base", ".ext");
        assert_eq!(naming.segment_name(0), "base000.ext");
        assert_eq!(naming.segment_name(1), "base001.ext");
        assert_eq!(naming.segment_name(2), "base002.ext");
        assert_eq!(naming.segment_name(42), "base042.ext");
        assert_eq!(naming.segment_name(1000), "base1000.ext");
    }

    #[test]
    fn test_names_sort_in_temporal_order() {
        let naming = SegmentNaming::new("track", "mp3");
        let mut names: Vec<String> = (0..120).map(|i| naming.segment_name(i)).collect();
        let expected = names.clone();
        names.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_from_source() {
        let naming = SegmentNaming::from_source(Path::new("/music/Live Set.mp3"));
        assert_eq!(naming.base(), "Live Set");
        assert_eq!(naming.extension(), ".mp3");
        assert_eq!(naming.segment_name(3), "Live Set003.mp3");
        assert_eq!(naming.archive_name(), "Live Set-segments.zip");
    }

    #[test]
    fn test_from_source_without_extension() {
        let naming = SegmentNaming::from_source(Path::new("recording"));
        assert_eq!(naming.segment_name(0), "recording000");
    }

    #[test]
    fn test_base_is_sanitized() {
        let naming = SegmentNaming::new("../evil:name", "wav");
        assert!(!naming.base().contains('/'));
        assert!(!naming.base().contains(".."));
    }
}
