//! Host environment detection.
//!
//! [`Environment::detect`] takes one snapshot of the machine: OS and
//! architecture, directories, and for each tool the stack needs whether
//! it is installed and which version. A tool whose version command fails,
//! exits non-zero or hangs past [`VERSION_TIMEOUT`] is recorded as absent.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use super::agent::Agent;
use crate::config::defaults;
use crate::shell::{capture_with_timeout, command_exists};

/// Upper bound on a single `--version` probe.
pub const VERSION_TIMEOUT: Duration = Duration::from_secs(3);

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").expect("valid version regex"));

/// Presence and version of one tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ToolStatus {
    /// A tool found with the given version output.
    pub fn found(raw_version: &str) -> Self {
        Self {
            found: true,
            version: Some(extract_version(raw_version)),
        }
    }

    /// A tool that is not installed.
    pub fn missing() -> Self {
        Self::default()
    }

    fn from_output(output: Option<String>) -> Self {
        output.map_or_else(Self::missing, |raw| Self::found(&raw))
    }
}

/// Reduce `Docker version 24.0.6, build ed223bc` to `24.0.6`.
///
/// Returns the trimmed input when it contains no version number.
pub fn extract_version(raw: &str) -> String {
    VERSION_RE
        .find(raw)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Immutable snapshot of the host machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub os: String,
    pub arch: String,
    pub home_dir: PathBuf,
    pub work_dir: PathBuf,
    pub shell: String,

    // Runtimes
    pub docker: ToolStatus,
    pub compose: ToolStatus,
    pub node: ToolStatus,
    pub python: ToolStatus,
    /// The interpreter that answered, `python3` or `python`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_program: Option<String>,
    pub go: ToolStatus,
    pub git: ToolStatus,

    // Coding agents
    pub has_claude: bool,
    pub has_codex: bool,
    pub has_cursor: bool,
    pub has_aider: bool,

    // Cloud
    pub aws_cli: ToolStatus,
    pub aws_region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,

    // Package managers
    pub has_brew: bool,
    pub has_apt: bool,
    pub has_pip: bool,
    pub has_npm: bool,
}

impl Environment {
    /// Scan the real machine.
    pub fn detect() -> Self {
        Self::detect_with(
            |program, args| capture_with_timeout(program, args, VERSION_TIMEOUT),
            command_exists,
            |key| std::env::var(key),
        )
    }

    /// Scan with injected probes (for testing).
    ///
    /// `version_fn` runs a version command and returns its stdout,
    /// `exists_fn` reports whether a binary is on PATH and `env_fn` reads
    /// environment variables.
    pub fn detect_with<V, E, F>(version_fn: V, exists_fn: E, env_fn: F) -> Self
    where
        V: Fn(&str, &[&str]) -> Option<String>,
        E: Fn(&str) -> bool,
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let non_empty = |key: &str| env_fn(key).ok().filter(|v| !v.is_empty());

        let (python_program, python) = ["python3", "python"]
            .iter()
            .find_map(|program| {
                version_fn(program, &["--version"]).map(|out| (program.to_string(), out))
            })
            .map_or((None, ToolStatus::missing()), |(program, out)| {
                (Some(program), ToolStatus::found(&out))
            });

        let shell_var = if cfg!(target_os = "windows") {
            "COMSPEC"
        } else {
            "SHELL"
        };

        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            home_dir: dirs::home_dir().unwrap_or_default(),
            work_dir: std::env::current_dir().unwrap_or_default(),
            shell: non_empty(shell_var).unwrap_or_default(),

            docker: ToolStatus::from_output(version_fn("docker", &["--version"])),
            compose: ToolStatus::from_output(version_fn("docker", &["compose", "version"])),
            node: ToolStatus::from_output(version_fn("node", &["--version"])),
            python,
            python_program,
            go: ToolStatus::from_output(version_fn("go", &["version"])),
            git: ToolStatus::from_output(version_fn("git", &["--version"])),

            has_claude: exists_fn(Agent::Claude.binary()),
            has_codex: exists_fn(Agent::Codex.binary()),
            has_cursor: exists_fn(Agent::Cursor.binary()),
            has_aider: exists_fn(Agent::Aider.binary()),

            aws_cli: ToolStatus::from_output(version_fn("aws", &["--version"])),
            aws_region: non_empty("AWS_REGION")
                .or_else(|| non_empty("AWS_DEFAULT_REGION"))
                .unwrap_or_else(|| defaults::REGION.to_string()),
            aws_profile: non_empty("AWS_PROFILE"),

            has_brew: exists_fn("brew"),
            has_apt: exists_fn("apt-get"),
            has_pip: exists_fn("pip3") || exists_fn("pip"),
            has_npm: exists_fn("npm"),
        }
    }

    /// Hard requirements that are not installed, in a fixed order.
    pub fn missing_deps(&self) -> Vec<String> {
        let required = [
            (&self.docker, "docker"),
            (&self.compose, "docker-compose"),
            (&self.node, "node (v22+)"),
            (&self.python, "python3 (3.11+)"),
            (&self.git, "git"),
        ];
        required
            .iter()
            .filter(|(tool, _)| !tool.found)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Whether the agent's binary was found.
    pub fn has_agent(&self, agent: Agent) -> bool {
        match agent {
            Agent::Claude => self.has_claude,
            Agent::Codex => self.has_codex,
            Agent::Cursor => self.has_cursor,
            Agent::Aider => self.has_aider,
        }
    }

    /// The first available coding agent by priority.
    pub fn agent(&self) -> Option<Agent> {
        Agent::PRIORITY.into_iter().find(|a| self.has_agent(*a))
    }

    /// Binary name of the first available coding agent.
    pub fn agent_name(&self) -> Option<&'static str> {
        self.agent().map(Agent::binary)
    }

    /// Python interpreter to create virtualenvs with.
    pub fn python_program(&self) -> &str {
        self.python_program.as_deref().unwrap_or("python3")
    }

    /// Default install directory: `<workdir>/reposwarm`.
    pub fn install_dir(&self) -> PathBuf {
        self.work_dir.join(defaults::INSTALL_DIR_NAME)
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "  System:   {}/{}", self.os, self.arch);
        let _ = writeln!(out, "  Shell:    {}", self.shell);
        let _ = writeln!(out, "  Work dir: {}", self.work_dir.display());
        out.push_str("\n  Runtimes:\n");

        let runtimes = [
            ("Docker", &self.docker),
            ("Docker Compose", &self.compose),
            ("Node.js", &self.node),
            ("Python", &self.python),
            ("Go", &self.go),
            ("Git", &self.git),
            ("AWS CLI", &self.aws_cli),
        ];
        for (name, tool) in runtimes {
            match (&tool.version, tool.found) {
                (Some(version), true) => {
                    let _ = writeln!(out, "    ✓ {} ({})", name, version);
                }
                (None, true) => {
                    let _ = writeln!(out, "    ✓ {}", name);
                }
                _ => {
                    let _ = writeln!(out, "    ✗ {} (not found)", name);
                }
            }
        }

        out.push_str("\n  Coding Agents:\n");
        let agents: Vec<Agent> = Agent::PRIORITY
            .into_iter()
            .filter(|a| self.has_agent(*a))
            .collect();
        if agents.is_empty() {
            out.push_str("    (none detected)\n");
        }
        for agent in agents {
            let _ = writeln!(out, "    ✓ {}", agent.display_name());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_present() -> Environment {
        Environment {
            docker: ToolStatus::found("Docker version 24.0.6"),
            compose: ToolStatus::found("v2.24.5"),
            node: ToolStatus::found("v22.3.0"),
            python: ToolStatus::found("Python 3.12.1"),
            git: ToolStatus::found("git version 2.43.0"),
            ..Default::default()
        }
    }

    #[test]
    fn extract_version_finds_semver() {
        assert_eq!(extract_version("Docker version 24.0.6, build ed223bc"), "24.0.6");
        assert_eq!(extract_version("v22.3.0"), "22.3.0");
        assert_eq!(extract_version("Python 3.12"), "3.12");
        assert_eq!(extract_version("  nightly  "), "nightly");
    }

    #[test]
    fn missing_deps_lists_absent_hard_requirements() {
        let env = Environment {
            docker: ToolStatus::missing(),
            compose: ToolStatus::missing(),
            ..all_present()
        };
        assert_eq!(env.missing_deps(), vec!["docker", "docker-compose"]);
    }

    #[test]
    fn missing_deps_empty_when_all_present() {
        assert!(all_present().missing_deps().is_empty());
    }

    #[test]
    fn missing_deps_ignores_optional_tools() {
        let env = Environment {
            go: ToolStatus::missing(),
            aws_cli: ToolStatus::missing(),
            ..all_present()
        };
        assert!(env.missing_deps().is_empty());
    }

    #[test]
    fn agent_name_follows_priority() {
        let cases = [
            (Environment::default(), None),
            (
                Environment {
                    has_aider: true,
                    has_cursor: true,
                    ..Default::default()
                },
                Some("cursor"),
            ),
            (
                Environment {
                    has_claude: true,
                    has_codex: true,
                    ..Default::default()
                },
                Some("claude"),
            ),
            (
                Environment {
                    has_codex: true,
                    has_aider: true,
                    ..Default::default()
                },
                Some("codex"),
            ),
        ];
        for (env, expected) in cases {
            assert_eq!(env.agent_name(), expected);
        }
    }

    #[test]
    fn detect_with_records_failures_as_absent() {
        let env = Environment::detect_with(
            |program, args| match (program, args) {
                ("docker", ["--version"]) => Some("Docker version 25.0.1".to_string()),
                ("git", _) => Some("git version 2.40.0".to_string()),
                ("python", _) => Some("Python 3.11.4".to_string()),
                _ => None,
            },
            |binary| binary == "codex",
            |key| match key {
                "AWS_DEFAULT_REGION" => Ok("eu-central-1".to_string()),
                _ => Err(std::env::VarError::NotPresent),
            },
        );

        assert!(env.docker.found);
        assert_eq!(env.docker.version.as_deref(), Some("25.0.1"));
        assert!(!env.compose.found);
        assert!(!env.node.found);
        assert!(env.python.found);
        assert_eq!(env.python_program(), "python");
        assert_eq!(env.agent_name(), Some("codex"));
        assert_eq!(env.aws_region, "eu-central-1");
        assert_eq!(env.missing_deps(), vec!["docker-compose", "node (v22+)"]);
    }

    #[test]
    fn detect_with_prefers_aws_region_over_default_region() {
        let env = Environment::detect_with(
            |_, _| None,
            |_| false,
            |key| match key {
                "AWS_REGION" => Ok("ap-south-1".to_string()),
                "AWS_DEFAULT_REGION" => Ok("eu-central-1".to_string()),
                _ => Err(std::env::VarError::NotPresent),
            },
        );
        assert_eq!(env.aws_region, "ap-south-1");
    }

    #[test]
    fn detect_with_defaults_region() {
        let env = Environment::detect_with(|_, _| None, |_| false, |_| {
            Err(std::env::VarError::NotPresent)
        });
        assert_eq!(env.aws_region, "us-east-1");
        assert_eq!(env.missing_deps().len(), 5);
    }

    #[test]
    fn detect_real_environment_is_populated() {
        let env = Environment::detect();
        assert!(!env.os.is_empty());
        assert!(!env.arch.is_empty());
        assert!(!env.work_dir.as_os_str().is_empty());
    }

    #[test]
    fn install_dir_is_under_work_dir() {
        let env = Environment {
            work_dir: PathBuf::from("/work"),
            ..Default::default()
        };
        assert_eq!(env.install_dir(), PathBuf::from("/work/reposwarm"));
    }

    #[test]
    fn summary_mentions_sections_and_tools() {
        let env = Environment {
            has_claude: true,
            ..all_present()
        };
        let summary = env.summary();
        assert!(summary.contains("System:"));
        assert!(summary.contains("Runtimes:"));
        assert!(summary.contains("✓ Docker (24.0.6)"));
        assert!(summary.contains("✗ Go (not found)"));
        assert!(summary.contains("Claude Code"));
    }

    #[test]
    fn summary_without_agents_says_none() {
        assert!(Environment::default().summary().contains("(none detected)"));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(all_present()).unwrap();
        assert_eq!(json["docker"]["found"], true);
        assert!(json.get("homeDir").is_some());
        assert!(json.get("hasClaude").is_some());
    }
}
