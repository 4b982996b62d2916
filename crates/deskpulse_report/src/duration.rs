const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Renders elapsed seconds as `1d 2h 3m`. Seconds are only shown for spans
/// shorter than an hour. Absent, zero and negative values render as `-`.
pub fn format_duration(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => seconds as u64,
        _ => return "-".to_string(),
    };
    if seconds == 0 {
        return "< 1s".to_string();
    }

    let days = seconds / DAY;
    let hours = seconds % DAY / HOUR;
    let minutes = seconds % HOUR / MINUTE;
    let secs = seconds % MINUTE;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if days == 0 && hours == 0 {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}
