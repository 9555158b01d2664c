//! Archive delivery.
//!
//! Delivery is the last pipeline stage and the only one with effects
//! visible outside the run. The pipeline hands over finished archive bytes
//! and a suggested file name; how they reach the user is up to the
//! implementation.

mod file;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

pub use file::FileDelivery;

/// Receives a finished archive.
#[async_trait]
pub trait Delivery: Send {
    /// Hand off `archive` under `suggested_name`.
    ///
    /// Returns where the archive ended up.
    async fn deliver(&mut self, archive: Vec<u8>, suggested_name: &str) -> Result<PathBuf>;

    /// Reject a handoff of `suggested_name` that is bound to fail.
    ///
    /// Runs before any segment is extracted. Accepts everything by default.
    fn preflight(&self, _suggested_name: &str) -> Result<()> {
        Ok(())
    }
}
