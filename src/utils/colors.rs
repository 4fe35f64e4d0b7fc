/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Completion color:
/// 100 → green
/// \<50 → red
/// otherwise yellow
pub fn color_for_completion(value: Option<f64>) -> &'static str {
    match value {
        None => GREY,
        Some(v) if v >= 100.0 => GREEN,
        Some(v) if v < 50.0 => RED,
        Some(_) => YELLOW,
    }
}
