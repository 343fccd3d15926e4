//! Platform-specific shell detection.

use std::path::Path;

/// Known shell types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Cmd,
    Unknown,
}

impl ShellType {
    /// Parse shell type from executable name.
    pub fn from_executable(exe: &str) -> Self {
        let name = Path::new(exe)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "bash" => ShellType::Bash,
            "zsh" => ShellType::Zsh,
            "fish" => ShellType::Fish,
            "powershell" | "pwsh" => ShellType::PowerShell,
            "cmd" => ShellType::Cmd,
            _ => ShellType::Unknown,
        }
    }
}

/// Check if running in a CI environment.
///
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_type_from_executable() {
        assert_eq!(ShellType::from_executable("/bin/bash"), ShellType::Bash);
        assert_eq!(ShellType::from_executable("/usr/bin/zsh"), ShellType::Zsh);
        assert_eq!(ShellType::from_executable("/usr/bin/fish"), ShellType::Fish);
        assert_eq!(ShellType::from_executable("pwsh"), ShellType::PowerShell);
        assert_eq!(ShellType::from_executable("cmd.exe"), ShellType::Cmd);
        assert_eq!(ShellType::from_executable("unknown"), ShellType::Unknown);
    }

    #[test]
    fn is_ci_detects_environment() {
        // Just ensure function doesn't panic
        let _ = is_ci();
    }
}
