/// Format seconds as `MM:SS`, zero-padded and floored.
///
/// Non-finite or negative input renders as `00:00`. Minutes are not capped,
/// so an hour-long track reads `60:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Playback progress in percent, clamped to `0..=100`.
///
/// Returns 0 until a positive finite duration is known.
pub fn progress_percent(current: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !current.is_finite() {
        return 0.0;
    }
    (current / duration * 100.0).clamp(0.0, 100.0)
}
