//! FILENAME: cli/src/main.rs
//! PURPOSE: Entry point for the terminal spreadsheet.
//! CONTEXT: Parses `rows` and `cols` from positional arguments, then
//! runs a read-evaluate-print loop over stdin until `q` or EOF.

mod repl;
mod viewport;

use std::io::{self, Write};
use std::process;
use std::time::Instant;

use engine::Sheet;

use repl::Outcome;
use viewport::Viewport;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let (rows, cols) = match parse_dimensions(&args) {
        Ok(dims) => dims,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    };

    let mut sheet = Sheet::new(rows, cols);
    let mut viewport = Viewport::new();

    let start = Instant::now();
    let mut last_status = "ok".to_string();
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        viewport.print(&sheet, &mut stdout);
        let _ = write!(stdout, "{}", repl::prompt(start.elapsed(), &last_status));
        let _ = stdout.flush();

        input.clear();
        match stdin.read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = input.trim();
        match repl::dispatch(line, &mut sheet, &mut viewport) {
            Outcome::Continue(status) => last_status = status,
            Outcome::Quit => break,
        }
    }
}

/// Parses `rows`/`cols` from `args[1]`/`args[2]`, requiring both to be
/// positive integers.
fn parse_dimensions(args: &[String]) -> Result<(usize, usize), String> {
    if args.len() < 3 {
        return Err(format!("Usage: {} <rows> <cols>", args.first().map(String::as_str).unwrap_or("sheet")));
    }
    let rows: usize = args[1]
        .parse()
        .ok()
        .filter(|&n: &usize| n > 0)
        .ok_or_else(|| format!("Invalid rows: '{}'", args[1]))?;
    let cols: usize = args[2]
        .parse()
        .ok()
        .filter(|&n: &usize| n > 0)
        .ok_or_else(|| format!("Invalid cols: '{}'", args[2]))?;
    Ok((rows, cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_dimensions() {
        let args = vec!["sheet".to_string(), "10".to_string(), "20".to_string()];
        assert_eq!(parse_dimensions(&args), Ok((10, 20)));
    }

    #[test]
    fn rejects_missing_arguments() {
        let args = vec!["sheet".to_string()];
        assert!(parse_dimensions(&args).is_err());
    }

    #[test]
    fn rejects_zero_or_negative_dimensions() {
        let args = vec!["sheet".to_string(), "0".to_string(), "10".to_string()];
        assert!(parse_dimensions(&args).is_err());

        let args = vec!["sheet".to_string(), "-5".to_string(), "10".to_string()];
        assert!(parse_dimensions(&args).is_err());
    }

    #[test]
    fn rejects_non_numeric_dimensions() {
        let args = vec!["sheet".to_string(), "ten".to_string(), "10".to_string()];
        assert!(parse_dimensions(&args).is_err());
    }
}
