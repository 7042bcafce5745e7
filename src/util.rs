use std::time::Duration;

pub const ZERO_ELAPSED: &str = "00:00:00";

/// Format elapsed milliseconds as zero-padded `HH:MM:SS`.
///
/// Hours wrap at 24, so a 25 hour session reads `01:00:00`.
pub fn format_elapsed_ms(millis: u64) -> String {
    let seconds = (millis / 1000) % 60;
    let minutes = (millis / (1000 * 60)) % 60;
    let hours = (millis / (1000 * 60 * 60)) % 24;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn format_elapsed(elapsed: Duration) -> String {
    format_elapsed_ms(elapsed.as_millis().min(u64::MAX as u128) as u64)
}
