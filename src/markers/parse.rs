//! Marker time and marker file parsing.
//!
//! Times are accepted as plain seconds (`83.5`), `MM:SS(.fff)` or
//! `HH:MM:SS(.fff)`. Marker files hold either one time per line or an
//! Audacity label track, whose first tab-separated column is used.

use std::path::Path;

use crate::constants::marker_file::{AUDACITY_DELIMITER, COMMENT_PREFIX};
use crate::error::{Error, Result};

/// Parse a single marker time into seconds.
pub fn parse_marker_time(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let err = |reason: &str| Error::MarkerParse {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(err("empty value"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(err("expected SS, MM:SS or HH:MM:SS"));
    }

    let mut seconds = 0.0;
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        let value: f64 = part
            .parse()
            .map_err(|_| err(&format!("'{part}' is not a number")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(err("time components must be non-negative"));
        }
        // Only the last component may carry a fraction; minutes/seconds must be < 60.
        if i != last && value.fract() != 0.0 {
            return Err(err("only the seconds component may have a fraction"));
        }
        if i > 0 && value >= 60.0 {
            return Err(err("minutes and seconds must be below 60"));
        }
        seconds = seconds * 60.0 + value;
    }

    Ok(seconds)
}

/// Read marker times from a file.
///
/// Blank lines and lines starting with `#` are ignored. If any line contains
/// a tab the file is treated as an Audacity label track.
pub fn parse_marker_file(path: &Path) -> Result<Vec<f64>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::MarkerFileRead {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let is_label_track = contents
        .lines()
        .filter(|l| !is_skippable(l))
        .any(|l| l.contains('\t'));

    if is_label_track {
        parse_label_track(path, &contents)
    } else {
        contents
            .lines()
            .filter(|l| !is_skippable(l))
            .map(parse_marker_time)
            .collect()
    }
}

fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with(COMMENT_PREFIX)
}

/// Parse an Audacity label track (`start\tend\tlabel`).
fn parse_label_track(path: &Path, contents: &str) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(AUDACITY_DELIMITER)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(contents.as_bytes());

    let mut times = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::MarkerFileRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        let Some(start) = record.get(0) else {
            continue;
        };
        // Spectral selection rows start with a backslash.
        if start.trim().is_empty() || start.starts_with('\\') {
            continue;
        }
        times.push(parse_marker_time(start)?);
    }

    Ok(times)
}
