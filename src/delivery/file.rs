//! Delivery into a directory on disk.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::Delivery;
use crate::constants::DELIVERY_TEMP_PREFIX;
use crate::error::{Error, Result};

/// Writes the archive into `output_dir`.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed into place, so a reader never sees a half-written archive.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    output_dir: PathBuf,
    overwrite: bool,
}

impl FileDelivery {
    /// Deliver into `output_dir`, refusing to replace existing files.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
        }
    }

    /// Allow replacing an existing archive.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Full path an archive named `name` would be written to.
    ///
    /// Fails with [`Error::DeliveryExists`] when that file exists and
    /// overwriting is disabled.
    fn destination_for(&self, name: &str) -> Result<PathBuf> {
        let destination = self.output_dir.join(name);
        if !self.overwrite && destination.exists() {
            return Err(Error::DeliveryExists { path: destination });
        }
        Ok(destination)
    }
}

#[async_trait]
impl Delivery for FileDelivery {
    async fn deliver(&mut self, archive: Vec<u8>, suggested_name: &str) -> Result<PathBuf> {
        let destination = self.destination_for(suggested_name)?;
        let dir = self.output_dir.clone();
        let target = destination.clone();
        let name = suggested_name.to_string();

        let staged = tokio::task::spawn_blocking(move || stage(&dir, &target, &name, &archive))
            .await
            .map_err(|e| Error::Internal {
                message: format!("delivery task failed: {e}"),
            })??;

        // A caller that drops this future while staging gets no file: the
        // temporary is removed with the task's unclaimed result.
        persist(staged, &destination, suggested_name, self.overwrite)?;

        info!("Wrote {}", destination.display());
        Ok(destination)
    }

    fn preflight(&self, suggested_name: &str) -> Result<()> {
        self.destination_for(suggested_name).map(|_| ())
    }
}

fn delivery_error<'a>(name: &'a str, destination: &'a Path) -> impl Fn(io::Error) -> Error + 'a {
    move |source| Error::Delivery {
        name: name.to_string(),
        destination: destination.to_path_buf(),
        source,
    }
}

/// Write `bytes` to a synced temporary file next to `destination`.
fn stage(dir: &Path, destination: &Path, name: &str, bytes: &[u8]) -> Result<NamedTempFile> {
    let fail = delivery_error(name, destination);

    std::fs::create_dir_all(dir).map_err(&fail)?;

    let mut temp = tempfile::Builder::new()
        .prefix(DELIVERY_TEMP_PREFIX)
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(&fail)?;
    temp.write_all(bytes).map_err(&fail)?;
    temp.as_file().sync_all().map_err(&fail)?;
    debug!("staged {} bytes in {}", bytes.len(), temp.path().display());
    Ok(temp)
}

/// Rename a staged file into place.
fn persist(temp: NamedTempFile, destination: &Path, name: &str, overwrite: bool) -> Result<()> {
    let fail = delivery_error(name, destination);

    if overwrite {
        temp.persist(destination).map_err(|e| fail(e.error))?;
    } else {
        // Another writer may have created the file since the check.
        temp.persist_noclobber(destination).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                Error::DeliveryExists {
                    path: destination.to_path_buf(),
                }
            } else {
                fail(e.error)
            }
        })?;
    }
    Ok(())
}
