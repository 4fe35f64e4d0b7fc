//! Formatting utilities used for CLI and report outputs.

/// Seconds spent on the platform, rendered as `12h 05m`.
/// Missing values render as `--`.
pub fn format_time_spent(seconds: Option<i64>) -> String {
    let Some(secs) = seconds else {
        return "--".to_string();
    };

    let mins = secs.max(0) / 60;
    let hours = mins / 60;
    let minutes = mins % 60;

    format!("{:02}h {:02}m", hours, minutes)
}

/// Completion percentage with at most one decimal: `87.5%`, `100%`.
pub fn format_percentage(value: Option<f64>) -> String {
    match value {
        None => "--".to_string(),
        Some(v) if (v - v.round()).abs() < 0.05 => format!("{:.0}%", v.round()),
        Some(v) => format!("{:.1}%", v),
    }
}

/// Cut `s` to at most `max` characters, ending with "..." when shortened.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
