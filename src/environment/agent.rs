//! Coding agents the setup can be handed off to.

use std::fmt;
use std::path::Path;

use crate::shell::CommandSpec;

/// A coding-agent CLI that can drive the setup guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agent {
    Claude,
    Codex,
    Cursor,
    Aider,
}

impl Agent {
    /// Preference order when several agents are installed.
    pub const PRIORITY: [Agent; 4] = [Agent::Claude, Agent::Codex, Agent::Cursor, Agent::Aider];

    /// Binary name on PATH.
    pub fn binary(self) -> &'static str {
        match self {
            Agent::Claude => "claude",
            Agent::Codex => "codex",
            Agent::Cursor => "cursor",
            Agent::Aider => "aider",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Agent::Claude => "Claude Code",
            Agent::Codex => "Codex",
            Agent::Cursor => "Cursor",
            Agent::Aider => "Aider",
        }
    }

    /// Parse a binary name.
    pub fn from_binary(name: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|a| a.binary() == name)
    }

    /// Command that hands the agent guide at `guide` to this agent.
    ///
    /// Cursor is an editor without a prompt interface, so it has none.
    pub fn launch_command(self, install_dir: &Path, guide: &Path) -> Option<CommandSpec> {
        let spec = match self {
            Agent::Claude => CommandSpec::new(
                "claude",
                [
                    "--print".to_string(),
                    format!(
                        "Read {} and follow every step. Install RepoSwarm in {}. Verify each step before moving to the next.",
                        guide.display(),
                        install_dir.display()
                    ),
                ],
            ),
            Agent::Codex => CommandSpec::new(
                "codex",
                [format!(
                    "Follow the instructions in {} step by step to install RepoSwarm locally in {}",
                    guide.file_name().unwrap_or_default().to_string_lossy(),
                    install_dir.display()
                )],
            ),
            Agent::Aider => {
                CommandSpec::new("aider", ["--read".to_string(), guide.display().to_string()])
            }
            Agent::Cursor => return None,
        };
        Some(spec.in_dir(install_dir))
    }

    /// One-line shell command a user can paste to hand the guide over.
    pub fn manual_command(self, install_dir: &Path, guide_file: &str) -> Option<String> {
        let dir = install_dir.display();
        match self {
            Agent::Claude => Some(format!(
                "cd {} && claude \"Follow {} step by step\"",
                dir, guide_file
            )),
            Agent::Codex => Some(format!(
                "cd {} && codex \"Follow {} step by step\"",
                dir, guide_file
            )),
            Agent::Aider => Some(format!("cd {} && aider --read {}", dir, guide_file)),
            Agent::Cursor => None,
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}
