//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Sections, progress details and results.
    #[default]
    Normal,
    /// Results only (success, warning, summary lines).
    Quiet,
    /// Nothing except errors. Used when stdout carries JSON.
    Silent,
}

impl OutputMode {
    /// Pick the mode from the global CLI flags.
    pub fn from_flags(quiet: bool, json: bool) -> Self {
        if json {
            Self::Silent
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    /// Check if this mode shows section headers and progress details.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}
