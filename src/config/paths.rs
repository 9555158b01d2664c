//! Where the configuration file lives.
//!
//! `MARKSPLIT_CONFIG` names a file directly; otherwise the file sits in the
//! platform config directory.

use std::ffi::OsString;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::constants::{APP_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use crate::error::{Error, Result};

/// Platform configuration directory.
///
/// - Linux: `~/.config/marksplit/`
/// - macOS: `~/Library/Application Support/marksplit/`
/// - Windows: `%APPDATA%\marksplit\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Path of the config file, honouring `MARKSPLIT_CONFIG`.
pub fn config_file_path() -> Result<PathBuf> {
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV))
}

/// An empty override counts as unset.
fn resolve_config_path(explicit: Option<OsString>) -> Result<PathBuf> {
    match explicit {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join(CONFIG_FILE_NAME)),
    }
}
