//! Console messages. When a PDF is streamed to stdout, every message is
//! redirected to stderr so the document bytes stay clean.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI colors
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const FG_BLUE: &str = "\x1b[34m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_RED: &str = "\x1b[31m";

/// Icons
const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";

static STDOUT_RESERVED: AtomicBool = AtomicBool::new(false);

/// Reserve stdout for binary output (or release it).
pub fn reserve_stdout(reserved: bool) {
    STDOUT_RESERVED.store(reserved, Ordering::SeqCst);
}

pub fn stdout_reserved() -> bool {
    STDOUT_RESERVED.load(Ordering::SeqCst)
}

fn emit(color: &str, icon: &str, msg: impl fmt::Display) {
    if stdout_reserved() {
        eprintln!("{}{}{} {}{}", color, BOLD, icon, RESET, msg);
    } else {
        println!("{}{}{} {}{}", color, BOLD, icon, RESET, msg);
    }
}

pub fn info<T: fmt::Display>(msg: T) {
    emit(FG_BLUE, ICON_INFO, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    emit(FG_GREEN, ICON_OK, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    emit(FG_YELLOW, ICON_WARN, msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{}{}{} {}{}", FG_RED, BOLD, ICON_ERR, RESET, msg);
}
