//! Mock printer for testing.
//!
//! `MockPrinter` implements [`Printer`] and captures every call for later
//! assertion. Prompt answers can be queued.

use std::collections::VecDeque;

use crate::error::Result;

use super::Printer;

/// Captures all output for assertions.
#[derive(Debug, Default)]
pub struct MockPrinter {
    sections: Vec<String>,
    infos: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    lines: Vec<String>,
    prompts_shown: Vec<String>,
    answers: VecDeque<bool>,
    interactive: bool,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers returned by [`Printer::confirm`], in order.
    ///
    /// Once the queue is empty the prompt's default is returned.
    pub fn queue_answers(&mut self, answers: &[bool]) {
        self.answers.extend(answers.iter().copied());
        self.interactive = true;
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn infos(&self) -> &[String] {
        &self.infos
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Check if an info message containing `msg` was shown.
    pub fn has_info(&self, msg: &str) -> bool {
        self.infos.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_line(&self, msg: &str) -> bool {
        self.lines.iter().any(|m| m.contains(msg))
    }
}

impl Printer for MockPrinter {
    fn section(&mut self, title: &str) {
        self.sections.push(title.to_string());
    }

    fn info(&mut self, msg: &str) {
        self.infos.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.prompts_shown.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(default))
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_each_kind() {
        let mut printer = MockPrinter::new();
        printer.section("Setting up API");
        printer.info("Cloning");
        printer.success("API server is ready");
        printer.warning("slow");
        printer.error("boom");
        printer.line("  API: http://localhost:3000");

        assert_eq!(printer.sections(), ["Setting up API"]);
        assert!(printer.has_info("Clon"));
        assert!(printer.has_success("ready"));
        assert!(printer.has_warning("slow"));
        assert!(printer.has_error("boom"));
        assert!(printer.has_line("3000"));
    }

    #[test]
    fn confirm_uses_queue_then_default() {
        let mut printer = MockPrinter::new();
        printer.queue_answers(&[false]);
        assert!(printer.is_interactive());
        assert!(!printer.confirm("Launch?", true).unwrap());
        assert!(printer.confirm("Launch?", true).unwrap());
        assert_eq!(printer.prompts_shown().len(), 2);
    }
}
