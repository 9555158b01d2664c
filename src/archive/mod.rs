//! Archive packaging.
//!
//! Bundles extracted segments into a single ZIP archive under one
//! top-level folder named after the source.

mod packager;

use std::fmt::Debug;

use crate::error::Result;
use crate::extract::SegmentArtifact;
use crate::planner::SegmentNaming;

pub use packager::{ArchiveCompression, Packager};

/// Turns extracted segments into archive bytes.
///
/// Runs on a blocking thread, so implementations must be `Send + Sync`.
pub trait Archiver: Debug + Send + Sync {
    /// Pack `artifacts`, in the order given, into one archive.
    fn pack(&self, artifacts: &[SegmentArtifact], naming: &SegmentNaming) -> Result<Vec<u8>>;
}
