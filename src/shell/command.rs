//! Command execution.
//!
//! Provisioning runs two kinds of commands: foreground commands whose
//! combined output is captured (clone, install, build, compose), and
//! detached service processes whose output goes to a log file. Both go
//! through the [`CommandRunner`] trait so the pipeline can be exercised
//! without touching the host.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, SwarmError};

/// A program invocation: program, arguments, working directory, extra env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run (looked up on PATH unless it is a path).
    pub program: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables added on top of the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Create a spec for `program` with `args`.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// Set the working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add environment variables.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Render as a single display line (`npm run build`).
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Result of a foreground command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Combined stdout and stderr.
    pub output: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Create a success result.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            output: output.into(),
            duration: Duration::ZERO,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
            duration: Duration::ZERO,
            success: false,
        }
    }

    /// The last `lines` lines of output, for error messages.
    pub fn tail(&self, lines: usize) -> String {
        let all: Vec<&str> = self.output.trim_end().lines().collect();
        let start = all.len().saturating_sub(lines);
        all[start..].join("\n")
    }
}

/// Runs commands on behalf of the provisioner.
pub trait CommandRunner {
    /// Run a command to completion, capturing combined output.
    ///
    /// Returns `Err` only when the program could not be started; a
    /// non-zero exit is reported through [`CommandOutput::success`].
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Spawn a detached process with stdout and stderr going to `log`.
    ///
    /// Returns the pid. The process is not waited on.
    fn spawn_detached(&self, spec: &CommandSpec, log: File) -> Result<u32>;

    /// Run a command attached to the current terminal and wait for it.
    ///
    /// Nothing is captured; [`CommandOutput::output`] is empty.
    fn run_attached(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let start = Instant::now();
        debug!("Running: {}", spec.display());

        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SwarmError::CommandFailed {
                command: format!("{} ({})", spec.display(), e),
                code: None,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            exit_code: output.status.code(),
            output: combined,
            duration: start.elapsed(),
            success: output.status.success(),
        })
    }

    fn spawn_detached(&self, spec: &CommandSpec, log: File) -> Result<u32> {
        debug!("Spawning: {}", spec.display());

        let stderr = log.try_clone()?;
        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(stderr));

        // Own process group so a Ctrl-C in the invoking terminal leaves it running.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|e| SwarmError::CommandFailed {
            command: format!("{} ({})", spec.display(), e),
            code: None,
        })?;

        Ok(child.id())
    }

    fn run_attached(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let start = Instant::now();
        debug!("Running attached: {}", spec.display());

        let status = spec
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| SwarmError::CommandFailed {
                command: format!("{} ({})", spec.display(), e),
                code: None,
            })?;

        Ok(CommandOutput {
            exit_code: status.code(),
            output: String::new(),
            duration: start.elapsed(),
            success: status.success(),
        })
    }
}

/// Run a command and return its trimmed stdout, or `None` on any failure.
///
/// The child is killed if it has not exited within `timeout`. Used for
/// cheap `--version` probes where a hanging tool must not stall detection.
pub fn capture_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                debug!("{} timed out after {:?}", program, timeout);
                return None;
            }
            Ok(None) => thread::sleep(Duration::from_millis(20)),
            Err(_) => return None,
        }
    };

    if !status.success() {
        return None;
    }

    let mut stdout = String::new();
    child.stdout.take()?.read_to_string(&mut stdout).ok()?;
    Some(stdout.trim().to_string())
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", tool));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Whether `tool` is an executable on the system PATH.
pub fn command_exists(tool: &str) -> bool {
    resolve_tool_path(tool, &parse_system_path()).is_some()
}
