//! FILENAME: cli/src/repl.rs
//! PURPOSE: Command dispatch for the interactive loop.
//! CONTEXT: Every command either mutates the sheet/viewport or quits;
//! the loop itself (reading stdin, timing, printing the prompt) lives
//! in `main.rs` so this module can be exercised without real I/O.

use std::time::Duration;

use engine::Sheet;
use log::warn;

use crate::viewport::Viewport;

pub enum Outcome {
    Continue(String),
    Quit,
}

/// Parses and runs a single trimmed line of input against `sheet` and
/// `viewport`. Returns the status text for the next prompt, or
/// `Outcome::Quit` for the `q` command.
pub fn dispatch(line: &str, sheet: &mut Sheet, viewport: &mut Viewport) -> Outcome {
    if line == "q" {
        return Outcome::Quit;
    }
    if line.is_empty() {
        return Outcome::Continue("ok".to_string());
    }

    if line == "w" {
        viewport.scroll_up();
        return Outcome::Continue("ok".to_string());
    }
    if line == "s" {
        viewport.scroll_down(sheet.rows());
        return Outcome::Continue("ok".to_string());
    }
    if line == "a" {
        viewport.scroll_left();
        return Outcome::Continue("ok".to_string());
    }
    if line == "d" {
        viewport.scroll_right(sheet.cols());
        return Outcome::Continue("ok".to_string());
    }
    if let Some(target) = line.strip_prefix("scroll_to ") {
        return match viewport.scroll_to(target.trim(), sheet.rows(), sheet.cols()) {
            Ok(()) => Outcome::Continue("ok".to_string()),
            Err(()) => Outcome::Continue("Invalid cell".to_string()),
        };
    }
    if line == "disable_output" {
        viewport.disable();
        return Outcome::Continue("ok".to_string());
    }
    if line == "enable_output" {
        viewport.enable();
        return Outcome::Continue("ok".to_string());
    }

    if let Some(eq) = line.find('=') {
        let (cell_name, formula) = line.split_at(eq);
        let formula = &formula[1..];
        return match sheet.assign(cell_name.trim(), formula.trim()) {
            Ok(()) => Outcome::Continue("ok".to_string()),
            Err(err) => Outcome::Continue(err.to_string()),
        };
    }

    warn!("unrecognized command: {}", line);
    Outcome::Continue("Unrecognized".to_string())
}

/// Formats the elapsed-time/status prompt shown before each read.
pub fn prompt(elapsed: Duration, status: &str) -> String {
    format!("[{:.1}] ({}) > ", elapsed.as_secs_f64(), status)
}
