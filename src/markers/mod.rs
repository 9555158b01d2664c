//! Split-point markers.
//!
//! A [`MarkerSet`] holds the user's split points, always sorted by time.
//! Markers can be built up programmatically or parsed from command-line
//! strings and marker files.

mod parse;
mod set;

pub use parse::{parse_marker_file, parse_marker_time};
pub use set::{Marker, MarkerId, MarkerSet, MarkerSnapshot};
