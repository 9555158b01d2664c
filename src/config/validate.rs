//! Configuration validation.

use crate::archive::ArchiveCompression;
use crate::config::Config;
use crate::constants::MAX_COMPRESSION_LEVEL;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_defaults(config)?;
    validate_engine(config)?;
    validate_pipeline(config)?;
    Ok(())
}

fn validate_defaults(config: &Config) -> Result<()> {
    let defaults = &config.defaults;

    if defaults.compression == ArchiveCompression::Deflate
        && !(0..=MAX_COMPRESSION_LEVEL).contains(&defaults.compression_level)
    {
        return Err(Error::ConfigValidation {
            message: format!(
                "compression_level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {}",
                defaults.compression_level
            ),
        });
    }

    if let Some(dir) = &defaults.output_dir
        && dir.exists()
        && !dir.is_dir()
    {
        return Err(Error::ConfigValidation {
            message: format!("output_dir is not a directory: {}", dir.display()),
        });
    }

    Ok(())
}

fn validate_engine(config: &Config) -> Result<()> {
    for (key, path) in [
        ("ffmpeg_path", &config.engine.ffmpeg_path),
        ("ffprobe_path", &config.engine.ffprobe_path),
    ] {
        if let Some(path) = path
            && !path.is_file()
        {
            return Err(Error::ConfigValidation {
                message: format!("engine.{key} does not point to a file: {}", path.display()),
            });
        }
    }
    Ok(())
}

fn validate_pipeline(config: &Config) -> Result<()> {
    if config.pipeline.timeout_secs == Some(0) {
        return Err(Error::ConfigValidation {
            message: "timeout_secs must be at least 1".to_string(),
        });
    }
    Ok(())
}
