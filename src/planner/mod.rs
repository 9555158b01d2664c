//! Segment planning.
//!
//! Turns a set of marker times into an ordered list of non-overlapping
//! segment boundaries, and names the file each segment will become.

mod boundary;
mod naming;

pub use boundary::{SegmentBoundary, SegmentEnd, plan};
pub use naming::SegmentNaming;
