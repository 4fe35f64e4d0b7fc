//! coursereport main entrypoint.

use coursereport::run;
use coursereport::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
