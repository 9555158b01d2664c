//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::constants::MAX_COMPRESSION_LEVEL;
use crate::markers::parse_marker_time;

/// Parse a marker time (`83.5`, `1:23.5` or `0:01:23.5`).
pub fn parse_marker(s: &str) -> Result<f64, String> {
    parse_marker_time(s).map_err(|e| e.to_string())
}

/// Parse and validate a bounded float value.
///
/// # Arguments
///
/// * `s` - The string to parse
/// * `min` - Minimum allowed value (inclusive)
/// * `max` - Maximum allowed value (inclusive)
/// * `name` - Name of the parameter for error messages
pub fn parse_bounded_float(s: &str, min: f64, max: f64, name: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(min..=max).contains(&value) {
        return Err(format!(
            "{name} must be between {min} and {max}, got {value}"
        ));
    }

    Ok(value)
}

/// Parse a known track duration in seconds (must be positive).
pub fn parse_duration(s: &str) -> Result<f64, String> {
    let value = parse_bounded_float(s, 0.0, f64::MAX, "duration")?;
    if value == 0.0 {
        return Err("duration must be greater than 0".to_string());
    }
    Ok(value)
}

/// Parse and validate a deflate level (0-9).
pub fn parse_compression_level(s: &str) -> Result<i64, String> {
    let value: i64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid integer"))?;

    if !(0..=MAX_COMPRESSION_LEVEL).contains(&value) {
        return Err(format!(
            "compression level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {value}"
        ));
    }

    Ok(value)
}

/// Parse a timeout in whole seconds (must be at least 1).
pub fn parse_timeout(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number of seconds"))?;

    if value == 0 {
        return Err("timeout must be at least 1 second".to_string());
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_formats() {
        assert_eq!(parse_marker("83.5").unwrap(), 83.5);
        assert_eq!(parse_marker("1:23.5").unwrap(), 83.5);
        assert_eq!(parse_marker("0:01:23.5").unwrap(), 83.5);
    }

    #[test]
    fn test_parse_marker_invalid() {
        assert!(parse_marker("-1").is_err());
        assert!(parse_marker("abc").is_err());
        assert!(parse_marker("1:75").is_err());
    }

    #[test]
    fn test_parse_bounded_float_invalid_range() {
        let err = parse_bounded_float("11", 0.0, 10.0, "value").unwrap_err();
        assert!(err.contains("value must be between"));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10").unwrap(), 10.0);
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("-5").is_err());
    }

    #[test]
    fn test_parse_compression_level() {
        assert_eq!(parse_compression_level("0").unwrap(), 0);
        assert_eq!(parse_compression_level("9").unwrap(), 9);
        assert!(parse_compression_level("10").is_err());
        assert!(parse_compression_level("x").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30").unwrap(), 30);
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("1.5").is_err());
    }
}
