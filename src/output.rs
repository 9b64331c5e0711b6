//! Colored stderr output for hook results.

use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter.
///
/// Writes to stderr; pre-commit shows it when the hook fails or runs verbose.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a failed diagram as `<path>: <reason>`.
    pub(crate) fn file_failure(&self, input: &Path, reason: &dyn std::fmt::Display) {
        self.error(&format!("{}: {reason}", input.display()));
    }
}
