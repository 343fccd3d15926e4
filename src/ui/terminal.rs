//! Styled terminal output.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::{confirm, should_use_colors, OutputMode, Printer, SwarmTheme};

/// [`Printer`] writing to the terminal.
///
/// Errors go to stderr so they stay visible when stdout carries JSON.
pub struct TerminalPrinter {
    term: Term,
    err: Term,
    theme: SwarmTheme,
    mode: OutputMode,
    interactive: bool,
}

impl TerminalPrinter {
    /// Create a printer, picking colors from the terminal and `NO_COLOR`.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_colors(mode, should_use_colors())
    }

    pub fn with_colors(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors {
            SwarmTheme::new()
        } else {
            SwarmTheme::plain()
        };
        let term = Term::stdout();
        let interactive = term.is_term() && !crate::shell::is_ci();

        Self {
            term,
            err: Term::stderr(),
            theme,
            mode,
            interactive,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }
}

impl Printer for TerminalPrinter {
    fn section(&mut self, title: &str) {
        if self.mode.shows_progress() {
            writeln!(self.term, "{}", self.theme.format_section(title)).ok();
        }
    }

    fn info(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            writeln!(self.term, "{}", self.theme.format_info(msg)).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn line(&mut self, text: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", text).ok();
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if !self.interactive || !self.mode.shows_status() {
            return Ok(default);
        }
        confirm(question, default, &self.term)
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
