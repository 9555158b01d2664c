//! Boundary computation.

use serde::Serialize;

use crate::constants::MARKER_TICKS_PER_SECOND;

/// End of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentEnd {
    /// Segment stops at this time in seconds (exclusive).
    At(f64),
    /// Segment runs to the end of the track.
    Open,
}

impl SegmentEnd {
    /// End time in seconds, or `None` for an open end.
    pub fn seconds(self) -> Option<f64> {
        match self {
            Self::At(t) => Some(t),
            Self::Open => None,
        }
    }
}

/// One planned output segment spanning `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentBoundary {
    /// Zero-based ordinal.
    pub index: usize,
    /// Start time in seconds.
    pub start: f64,
    /// End of the segment.
    pub end: SegmentEnd,
}

impl SegmentBoundary {
    /// Segment length in seconds, if the end is known.
    ///
    /// For an open end this uses `track_duration` when provided.
    pub fn duration(&self, track_duration: Option<f64>) -> Option<f64> {
        self.end
            .seconds()
            .or(track_duration)
            .map(|end| end - self.start)
    }

    /// Whether `time` falls inside this segment.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && self.end.seconds().is_none_or(|end| time < end)
    }
}

/// Plan segment boundaries from marker times.
///
/// Markers may arrive in any order. Times equal after rounding to the
/// millisecond collapse to one split point, as does any marker on the
/// track start. When `total_duration` is known, markers at or past it are
/// dropped. The result always starts at 0, has no gaps or overlaps, and
/// ends with an open boundary, so it holds `unique markers + 1` entries.
pub fn plan(marker_times: &[f64], total_duration: Option<f64>) -> Vec<SegmentBoundary> {
    let end_tick = total_duration.map(to_ticks);

    let mut points: Vec<(i64, f64)> = marker_times
        .iter()
        .copied()
        .filter(|t| t.is_finite())
        .map(|t| (to_ticks(t), t))
        .filter(|&(tick, _)| tick > 0 && end_tick.is_none_or(|end| tick < end))
        .collect();

    points.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    points.dedup_by_key(|p| p.0);

    let mut starts = Vec::with_capacity(points.len() + 1);
    starts.push(0.0);
    starts.extend(points.into_iter().map(|(_, t)| t));

    let count = starts.len();
    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| SegmentBoundary {
            index,
            start,
            end: if index + 1 < count {
                SegmentEnd::At(starts[index + 1])
            } else {
                SegmentEnd::Open
            },
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn to_ticks(seconds: f64) -> i64 {
    (seconds * MARKER_TICKS_PER_SECOND).round() as i64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_two_markers_three_segments() {
        let boundaries = plan(&[3.0, 7.0], Some(10.0));
        assert_eq!(
            boundaries,
            vec![
                SegmentBoundary {
                    index: 0,
                    start: 0.0,
                    end: SegmentEnd::At(3.0)
                },
                SegmentBoundary {
                    index: 1,
                    start: 3.0,
                    end: SegmentEnd::At(7.0)
                },
                SegmentBoundary {
                    index: 2,
                    start: 7.0,
                    end: SegmentEnd::Open
                },
            ]
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let boundaries = plan(&[9.0, 1.5, 4.0], None);
        let starts: Vec<f64> = boundaries.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![0.0, 1.5, 4.0, 9.0]);
    }

    #[test]
    fn test_millisecond_duplicates_collapse() {
        let boundaries = plan(&[2.0, 2.0004, 5.0], None);
        assert_eq!(boundaries.len(), 3);
        assert_eq!(boundaries[1].start, 2.0);
        assert_eq!(boundaries[1].end, SegmentEnd::At(5.0));
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let boundaries = plan(&[4.0, 4.0, 4.0], None);
        assert_eq!(boundaries.len(), 2);
    }

    #[test]
    fn test_marker_at_zero_collapses_into_start() {
        let boundaries = plan(&[0.0, 0.0002, 5.0], None);
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].end, SegmentEnd::At(5.0));
    }

    #[test]
    fn test_markers_past_duration_dropped() {
        let boundaries = plan(&[3.0, 10.0, 12.0], Some(10.0));
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[1].end, SegmentEnd::Open);
    }

    #[test]
    fn test_unknown_duration_keeps_all_markers() {
        assert_eq!(plan(&[3.0, 10.0, 12.0], None).len(), 4);
    }

    #[test]
    fn test_empty_markers_single_open_boundary() {
        let boundaries = plan(&[], Some(10.0));
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].start, 0.0);
        assert_eq!(boundaries[0].end, SegmentEnd::Open);
    }

    #[test]
    fn test_no_gaps_or_overlaps() {
        let boundaries = plan(&[8.25, 0.5, 3.0, 3.0, 12.0, 6.125], None);
        for pair in boundaries.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert_eq!(pair[0].end, SegmentEnd::At(pair[1].start));
            assert_eq!(pair[0].index + 1, pair[1].index);
        }
        assert_eq!(boundaries.last().unwrap().end, SegmentEnd::Open);
    }

    #[test]
    fn test_duration_and_contains() {
        let boundaries = plan(&[3.0], Some(10.0));
        assert_eq!(boundaries[0].duration(Some(10.0)), Some(3.0));
        assert_eq!(boundaries[1].duration(Some(10.0)), Some(7.0));
        assert_eq!(boundaries[1].duration(None), None);
        assert!(boundaries[0].contains(0.0));
        assert!(!boundaries[0].contains(3.0));
        assert!(boundaries[1].contains(3.0));
        assert!(boundaries[1].contains(1_000.0));
    }
}
