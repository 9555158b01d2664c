//! Progress bar utilities for segment extraction.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress bar for extracting the segments of one source.
pub fn create_segment_progress(
    total_segments: usize,
    source_name: &str,
    enabled: bool,
) -> Option<ProgressBar> {
    if !enabled || total_segments == 0 {
        return None;
    }

    let pb = ProgressBar::new(total_segments as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos}}/{{len}} segments - {source_name} {{msg}}"
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Stop a progress bar in place, leaving it visible with a message.
pub fn abandon_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.abandon_with_message(message.to_string());
    }
}

/// Format seconds as `HH:MM:SS.mmm`, or `MM:SS.mmm` under an hour.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    if hours > 0 {
        format!("{hours:02}:{mins:02}:{secs:02}.{ms:03}")
    } else {
        format!("{mins:02}:{secs:02}.{ms:03}")
    }
}
