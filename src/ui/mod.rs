//! Terminal output for the bootstrap.
//!
//! This module provides:
//! - [`Printer`] trait, the narrow output capability the pipeline writes to
//! - [`TerminalPrinter`] for styled terminal output
//! - [`MockPrinter`] for capturing output in tests
//!
//! # Example
//!
//! ```
//! use reposwarm::ui::{MockPrinter, Printer};
//!
//! let mut printer = MockPrinter::new();
//! printer.section("Checking prerequisites");
//! printer.success("All prerequisites found");
//! assert!(printer.has_success("prerequisites"));
//! ```

pub mod mock;
pub mod output;
pub mod prompts;
pub mod terminal;
pub mod theme;

pub use mock::MockPrinter;
pub use output::OutputMode;
pub use prompts::confirm;
pub use terminal::TerminalPrinter;
pub use theme::{should_use_colors, SwarmTheme};

use crate::error::Result;

/// Output capability injected into the bootstrap.
///
/// This trait allows capturing output in tests.
pub trait Printer {
    /// Start a new section (one per pipeline step).
    fn section(&mut self, title: &str);

    /// Progress detail inside a section.
    fn info(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Always shown, even when other output is suppressed.
    fn error(&mut self, msg: &str);

    /// Unstyled line, used for summaries.
    fn line(&mut self, text: &str);

    /// Ask a yes/no question. Non-interactive printers return `default`.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Whether a human can answer prompts.
    fn is_interactive(&self) -> bool;
}
