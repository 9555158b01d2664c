//! Sorted marker collection.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Opaque marker identifier, unique within its [`MarkerSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single split point on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    /// Identifier assigned when the marker was added.
    pub id: MarkerId,
    /// Position in seconds from the start of the track.
    pub time: f64,
}

/// Markers ordered ascending by time.
///
/// Every mutation re-establishes the ordering. Markers with equal times are
/// allowed here and kept in insertion order; the planner collapses them.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    next_id: u64,
}

impl MarkerSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw times in any order.
    pub fn from_times<I>(times: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut set = Self::new();
        for time in times {
            set.add(time)?;
        }
        Ok(set)
    }

    /// Add a marker and return its id.
    pub fn add(&mut self, time: f64) -> Result<MarkerId> {
        validate_time(time)?;
        let id = MarkerId(self.next_id);
        self.next_id += 1;

        // Insert after any equal times so ties keep insertion order.
        let pos = self.markers.partition_point(|m| m.time <= time);
        self.markers.insert(pos, Marker { id, time });
        Ok(id)
    }

    /// Remove a marker, returning it if it was present.
    pub fn remove(&mut self, id: MarkerId) -> Option<Marker> {
        let pos = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(pos))
    }

    /// Move a marker to a new time.
    pub fn set_time(&mut self, id: MarkerId, time: f64) -> Result<()> {
        validate_time(time)?;
        let marker = self
            .markers
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(Error::MarkerNotFound { id: id.0 })?;
        marker.time = time;
        self.markers.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(())
    }

    /// Look up a marker by id.
    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Remove all markers.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Number of markers, duplicates included.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the set has no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterate markers in time order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Marker times in ascending order.
    pub fn times(&self) -> Vec<f64> {
        self.markers.iter().map(|m| m.time).collect()
    }

    /// Take an immutable copy of the current times.
    pub fn snapshot(&self) -> MarkerSnapshot {
        MarkerSnapshot {
            times: self.times().into(),
        }
    }
}

/// Frozen copy of a marker set's times, taken when an export starts.
///
/// Later edits to the originating [`MarkerSet`] do not affect the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSnapshot {
    times: Arc<[f64]>,
}

impl MarkerSnapshot {
    /// Times in ascending order.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of markers captured.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

fn validate_time(time: f64) -> Result<()> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidMarkerTime { value: time })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_sorted() {
        let mut set = MarkerSet::new();
        set.add(7.0).unwrap();
        set.add(3.0).unwrap();
        set.add(5.5).unwrap();
        assert_eq!(set.times(), vec![3.0, 5.5, 7.0]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut set = MarkerSet::new();
        let a = set.add(1.0).unwrap();
        let b = set.add(1.0).unwrap();
        assert_ne!(a, b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_duplicate_times_keep_insertion_order() {
        let mut set = MarkerSet::new();
        let first = set.add(2.0).unwrap();
        let second = set.add(2.0).unwrap();
        let ids: Vec<MarkerId> = set.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let mut set = MarkerSet::new();
        assert!(matches!(
            set.add(-0.5),
            Err(Error::InvalidMarkerTime { .. })
        ));
        assert!(set.add(f64::NAN).is_err());
        assert!(set.add(f64::INFINITY).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut set = MarkerSet::from_times([1.0, 2.0]).unwrap();
        let id = set.iter().next().unwrap().id;
        let removed = set.remove(id).unwrap();
        assert_eq!(removed.time, 1.0);
        assert!(set.remove(id).is_none());
        assert_eq!(set.times(), vec![2.0]);
    }

    #[test]
    fn test_set_time_resorts() {
        let mut set = MarkerSet::new();
        let a = set.add(1.0).unwrap();
        set.add(4.0).unwrap();
        set.set_time(a, 9.0).unwrap();
        assert_eq!(set.times(), vec![4.0, 9.0]);
        assert_eq!(set.get(a).unwrap().time, 9.0);
    }

    #[test]
    fn test_set_time_rejects_negative() {
        let mut set = MarkerSet::new();
        let a = set.add(1.0).unwrap();
        assert!(set.set_time(a, -1.0).is_err());
        assert_eq!(set.get(a).unwrap().time, 1.0);
    }

    #[test]
    fn test_set_time_unknown_id() {
        let mut set = MarkerSet::new();
        let a = set.add(1.0).unwrap();
        set.remove(a);
        assert!(matches!(
            set.set_time(a, 2.0),
            Err(Error::MarkerNotFound { .. })
        ));
    }

    #[test]
    fn test_snapshot_is_immutable_copy() {
        let mut set = MarkerSet::from_times([3.0, 1.0]).unwrap();
        let snapshot = set.snapshot();
        set.add(2.0).unwrap();
        set.clear();
        assert_eq!(snapshot.times(), &[1.0, 3.0]);
        assert_eq!(snapshot.len(), 2);
    }
}
