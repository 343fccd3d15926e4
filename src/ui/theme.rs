//! Visual theme and styling.

use console::Style;

/// RepoSwarm's visual theme.
#[derive(Debug, Clone)]
pub struct SwarmTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for progress details (dim).
    pub info: Style,
    /// Style for section headers (cyan bold).
    pub section: Style,
    pub highlight: Style,
}

impl Default for SwarmTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl SwarmTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().dim(),
            section: Style::new().cyan().bold(),
            highlight: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            section: Style::new(),
            highlight: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("  ✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("  ⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("  ✗ {}", msg)))
    }

    pub fn format_info(&self, msg: &str) -> String {
        format!("{}", self.info.apply_to(format!("  · {}", msg)))
    }

    /// Format a section header.
    pub fn format_section(&self, title: &str) -> String {
        format!("\n{}", self.section.apply_to(format!("▸ {}", title)))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
