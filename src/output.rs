//! Terminal output formatting for the arlunio CLI.
//!
//! Provides Cargo-style status output with right-aligned coloured verbs.
//! All status output goes to stderr; stdout is reserved for listings and JSON.

use std::io::{self, IsTerminal, Write};

use crate::validation::{Severity, ValidationResult};

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Colour is enabled when stderr is a terminal. A quiet printer drops
/// status lines but still reports warnings and errors.
pub struct Printer {
    color: bool,
    quiet: bool,
}

impl Printer {
    pub fn new(quiet: bool) -> Self {
        Self {
            color: io::stderr().is_terminal(),
            quiet,
        }
    }

    /// Print a status line with a green bold verb.
    /// e.g. "   Rendering Circle (64x64)"
    pub fn status(&self, verb: &str, message: &str) {
        if !self.quiet {
            self.print_line(GREEN, verb, message);
        }
    }

    /// Print an informational line with a cyan bold verb.
    pub fn info(&self, verb: &str, message: &str) {
        if !self.quiet {
            self.print_line(CYAN, verb, message);
        }
    }

    /// Print a warning line with a yellow bold verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Print an error line with a red bold verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Format a string as dim/grey.
    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    /// Format a string as bold.
    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// Format a string as cyan (for paths, names).
    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// Print every diagnostic followed by a summary line.
    pub fn diagnostics(&self, result: &ValidationResult) {
        let mut stderr = io::stderr().lock();
        for d in result.iter() {
            let (label, color) = match d.severity {
                Severity::Error => ("error", RED),
                Severity::Warning => ("warning", YELLOW),
            };
            let label = if self.color {
                format!("{BOLD}{color}{label}{RESET}")
            } else {
                label.to_string()
            };
            let _ = writeln!(stderr, "{}[{}]: {}", label, d.code, d.message);
            if let Some(help) = &d.help {
                let _ = writeln!(stderr, "  {} {}", self.dim("help:"), help);
            }
        }
        drop(stderr);

        let summary = format!(
            "{}, {}",
            plural(result.error_count(), "error", "errors"),
            plural(result.warning_count(), "warning", "warnings")
        );
        if result.has_errors() {
            self.error("Failed", &summary);
        } else {
            self.status("Checked", &summary);
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(
                stderr,
                "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}"
            );
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// Pluralize a count: `plural(1, "warning", "warnings")` → "1 warning".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &std::path::Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(0, "error", "errors"), "0 errors");
        assert_eq!(plural(1, "error", "errors"), "1 error");
        assert_eq!(plural(5, "warning", "warnings"), "5 warnings");
    }

    #[test]
    fn test_display_path_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(display_path(&cwd.join("out.png")), "out.png");
        assert_eq!(display_path(&cwd), ".");
    }

    #[test]
    fn test_display_path_absolute() {
        let p = std::path::Path::new("/nonexistent/path/to/file.png");
        assert_eq!(display_path(p), "/nonexistent/path/to/file.png");
    }

    #[test]
    fn test_plain_formatting() {
        let printer = Printer {
            color: false,
            quiet: true,
        };
        assert_eq!(printer.bold("Circle"), "Circle");
        assert_eq!(printer.dim("->"), "->");
    }
}
