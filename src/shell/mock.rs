//! Recording command runner for tests.
//!
//! `MockRunner` implements [`CommandRunner`] without starting processes.
//! Every call is recorded; commands can be made to fail by matching the
//! start of their display line.
//!
//! # Example
//!
//! ```
//! use reposwarm::shell::{CommandRunner, CommandSpec, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.fail_on("npm run build", "tsc: error TS2307");
//!
//! let out = runner.run(&CommandSpec::new("npm", ["run", "build"])).unwrap();
//! assert!(!out.success);
//! assert!(runner.ran("npm run build"));
//! ```

use std::cell::{Cell, RefCell};
use std::fs::{self, File};

use crate::error::{Result, SwarmError};

use super::{CommandOutput, CommandRunner, CommandSpec};

/// [`CommandRunner`] that records calls instead of running them.
///
/// `git clone <url> <dir>` creates `<cwd>/<dir>` so later stages find a
/// checkout.
#[derive(Debug)]
pub struct MockRunner {
    calls: RefCell<Vec<CommandSpec>>,
    spawned: RefCell<Vec<CommandSpec>>,
    failures: RefCell<Vec<(String, String)>>,
    spawn_failures: RefCell<Vec<String>>,
    outputs: RefCell<Vec<(String, String)>>,
    next_pid: Cell<u32>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            spawned: RefCell::new(Vec::new()),
            failures: RefCell::new(Vec::new()),
            spawn_failures: RefCell::new(Vec::new()),
            outputs: RefCell::new(Vec::new()),
            next_pid: Cell::new(10_000),
        }
    }

    /// Make foreground commands starting with `prefix` exit 1 with `output`.
    pub fn fail_on(&self, prefix: &str, output: &str) {
        self.failures
            .borrow_mut()
            .push((prefix.to_string(), output.to_string()));
    }

    /// Make detached launches starting with `prefix` fail to spawn.
    pub fn fail_spawn_on(&self, prefix: &str) {
        self.spawn_failures.borrow_mut().push(prefix.to_string());
    }

    /// Return `output` for successful commands starting with `prefix`.
    pub fn respond(&self, prefix: &str, output: &str) {
        self.outputs
            .borrow_mut()
            .push((prefix.to_string(), output.to_string()));
    }

    /// Foreground commands, in call order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Detached launches, in call order.
    pub fn spawned(&self) -> Vec<CommandSpec> {
        self.spawned.borrow().clone()
    }

    /// Whether any foreground command's display line starts with `prefix`.
    pub fn ran(&self, prefix: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.display().starts_with(prefix))
    }

    /// Whether any detached launch's display line contains `needle`.
    pub fn launched(&self, needle: &str) -> bool {
        self.spawned
            .borrow()
            .iter()
            .any(|c| c.display().contains(needle))
    }

    fn simulate_clone(spec: &CommandSpec) {
        if spec.program != "git" || spec.args.first().map(String::as_str) != Some("clone") {
            return;
        }
        if let (Some(cwd), Some(dir)) = (&spec.cwd, spec.args.get(2)) {
            let _ = fs::create_dir_all(cwd.join(dir));
        }
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        let line = spec.display();

        if let Some((_, output)) = self
            .failures
            .borrow()
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
        {
            return Ok(CommandOutput::failure(Some(1), output.clone()));
        }

        Self::simulate_clone(spec);

        let output = self
            .outputs
            .borrow()
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        Ok(CommandOutput::success(output))
    }

    fn spawn_detached(&self, spec: &CommandSpec, _log: File) -> Result<u32> {
        let line = spec.display();
        if self
            .spawn_failures
            .borrow()
            .iter()
            .any(|prefix| line.contains(prefix.as_str()))
        {
            return Err(SwarmError::CommandFailed {
                command: line,
                code: None,
            });
        }

        self.spawned.borrow_mut().push(spec.clone());
        let pid = self.next_pid.get();
        self.next_pid.set(pid + 1);
        Ok(pid)
    }

    fn run_attached(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.run(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clone_creates_target_dir() {
        let temp = TempDir::new().unwrap();
        let runner = MockRunner::new();
        let spec = CommandSpec::new("git", ["clone", "https://x/api.git", "api"]).in_dir(temp.path());

        assert!(runner.run(&spec).unwrap().success);
        assert!(temp.path().join("api").is_dir());
    }

    #[test]
    fn failures_match_prefix() {
        let runner = MockRunner::new();
        runner.fail_on("npm install", "E404");

        let out = runner.run(&CommandSpec::new("npm", ["install"])).unwrap();
        assert!(!out.success);
        assert_eq!(out.output, "E404");

        let ok = runner.run(&CommandSpec::new("npm", ["start"])).unwrap();
        assert!(ok.success);
    }

    #[test]
    fn spawn_assigns_increasing_pids() {
        let temp = TempDir::new().unwrap();
        let runner = MockRunner::new();
        let log = || File::create(temp.path().join("x.log")).unwrap();
        let a = runner.spawn_detached(&CommandSpec::new("npm", ["start"]), log()).unwrap();
        let b = runner.spawn_detached(&CommandSpec::new("npm", ["run", "dev"]), log()).unwrap();
        assert_eq!(b, a + 1);
        assert!(runner.launched("run dev"));
    }

    #[test]
    fn spawn_failure_is_error() {
        let temp = TempDir::new().unwrap();
        let runner = MockRunner::new();
        runner.fail_spawn_on("worker.main");
        let spec = CommandSpec::new("/w/.venv/bin/python", ["-m", "worker.main"]);
        let log = File::create(temp.path().join("w.log")).unwrap();
        assert!(runner.spawn_detached(&spec, log).is_err());
    }
}
