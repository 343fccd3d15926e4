//! Minimal Markdown writer for the generated guides.

/// Appends Markdown blocks to a string buffer.
#[derive(Debug, Default)]
pub(crate) struct Markdown {
    out: String,
}

impl Markdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// `#`-style heading at `level`, followed by a blank line.
    pub fn heading(&mut self, level: usize, text: &str) -> &mut Self {
        self.out.push_str(&"#".repeat(level.max(1)));
        self.out.push(' ');
        self.out.push_str(text);
        self.out.push_str("\n\n");
        self
    }

    /// A paragraph.
    pub fn para(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.out.push_str(text.as_ref());
        self.out.push_str("\n\n");
        self
    }

    /// A single line with no blank line after it.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
        self
    }

    /// A bullet list.
    pub fn list<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self.out.push_str("- ");
            self.out.push_str(item.as_ref());
            self.out.push('\n');
        }
        self.out.push('\n');
        self
    }

    /// A fenced code block. `body` gets a trailing newline if it lacks one.
    pub fn code(&mut self, lang: &str, body: &str) -> &mut Self {
        self.out.push_str("```");
        self.out.push_str(lang);
        self.out.push('\n');
        self.out.push_str(body);
        if !body.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str("```\n\n");
        self
    }

    /// A horizontal rule.
    pub fn rule(&mut self) -> &mut Self {
        self.out.push_str("---\n\n");
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Shell snippet writing `body` to `file` through a quoted heredoc.
pub(crate) fn heredoc(file: &str, body: &str) -> String {
    let mut out = format!("cat > {} << 'EOF'\n", file);
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("EOF\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_blocks_in_order() {
        let mut md = Markdown::new();
        md.heading(2, "Setup")
            .para("Run this:")
            .code("bash", "make")
            .list(["one", "two"]);
        assert_eq!(
            md.finish(),
            "## Setup\n\nRun this:\n\n```bash\nmake\n```\n\n- one\n- two\n\n"
        );
    }

    #[test]
    fn heredoc_is_quoted() {
        assert_eq!(heredoc(".env", "A=1\n"), "cat > .env << 'EOF'\nA=1\nEOF\n");
    }
}
