//! Stop command implementation.
//!
//! The `reposwarm stop` command terminates the services a previous
//! `reposwarm new --local` launched, using the pid files it left behind,
//! and brings the Temporal compose stack down.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::Result;
use crate::provision::{compose, ProcessHandle, ServiceKind, COMPOSE_FILE_NAME};
use crate::shell::CommandRunner;
use crate::ui::Printer;

use super::dispatcher::{Command, CommandResult};

/// Services in the order they are stopped.
const STOP_ORDER: [ServiceKind; 3] = [ServiceKind::Ui, ServiceKind::Worker, ServiceKind::Api];

/// The stop command implementation.
pub struct StopCommand<'a> {
    install_dir: PathBuf,
    runner: &'a dyn CommandRunner,
}

impl<'a> StopCommand<'a> {
    pub fn new(install_dir: PathBuf, runner: &'a dyn CommandRunner) -> Self {
        Self {
            install_dir,
            runner,
        }
    }

    /// Returns false if the service had a pid file but could not be stopped.
    fn stop_service(&self, kind: ServiceKind, printer: &mut dyn Printer) -> bool {
        let dir = self.install_dir.join(kind.name());
        let handle = match ProcessHandle::from_pid_file(kind.name(), &dir) {
            Ok(handle) => handle,
            Err(e) => {
                debug!("No handle for {}: {}", kind, e);
                printer.info(&format!("{}: not running", kind.display_name()));
                return true;
            }
        };

        match handle.terminate() {
            Ok(()) => {
                printer.success(&format!("Stopped {} (pid {})", kind.display_name(), handle.pid));
                true
            }
            Err(e) => {
                warn!("Failed to stop {}: {}", kind, e);
                printer.error(&format!("Failed to stop {}: {}", kind.display_name(), e));
                false
            }
        }
    }

    fn stop_temporal(&self, printer: &mut dyn Printer) -> Result<bool> {
        let dir = self.install_dir.join("temporal");
        if !dir.join(COMPOSE_FILE_NAME).is_file() {
            printer.info("Temporal: no compose file");
            return Ok(true);
        }

        let output = self.runner.run(&compose::down_command().in_dir(&dir))?;
        if output.success {
            printer.success("Stopped Temporal");
        } else {
            printer.error(&format!("docker compose down failed: {}", output.tail(5)));
        }
        Ok(output.success)
    }
}

impl Command for StopCommand<'_> {
    fn execute(&self, printer: &mut dyn Printer) -> Result<CommandResult> {
        printer.section(&format!("Stopping RepoSwarm in {}", self.install_dir.display()));

        let mut ok = true;
        for kind in STOP_ORDER {
            ok &= self.stop_service(kind, printer);
        }
        ok &= self.stop_temporal(printer)?;

        Ok(if ok {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;
    use crate::ui::MockPrinter;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn nothing_to_stop_is_success() {
        let temp = TempDir::new().unwrap();
        let runner = MockRunner::new();
        let mut printer = MockPrinter::new();

        let result = StopCommand::new(temp.path().to_path_buf(), &runner)
            .execute(&mut printer)
            .unwrap();

        assert!(result.success);
        assert!(printer.has_info("API server: not running"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn brings_compose_stack_down() {
        let temp = TempDir::new().unwrap();
        let temporal = temp.path().join("temporal");
        fs::create_dir_all(&temporal).unwrap();
        fs::write(temporal.join(COMPOSE_FILE_NAME), "services: {}\n").unwrap();
        let runner = MockRunner::new();
        let mut printer = MockPrinter::new();

        StopCommand::new(temp.path().to_path_buf(), &runner)
            .execute(&mut printer)
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].display(), "docker compose down");
        assert_eq!(calls[0].cwd.as_deref(), Some(temporal.as_path()));
        assert!(printer.has_success("Stopped Temporal"));
    }

    #[test]
    fn failed_compose_down_fails_command() {
        let temp = TempDir::new().unwrap();
        let temporal = temp.path().join("temporal");
        fs::create_dir_all(&temporal).unwrap();
        fs::write(temporal.join(COMPOSE_FILE_NAME), "services: {}\n").unwrap();
        let runner = MockRunner::new();
        runner.fail_on("docker compose down", "daemon not running");
        let mut printer = MockPrinter::new();

        let result = StopCommand::new(temp.path().to_path_buf(), &runner)
            .execute(&mut printer)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(printer.has_error("daemon not running"));
    }

    #[cfg(unix)]
    #[test]
    fn terminates_service_from_pid_file() {
        let temp = TempDir::new().unwrap();
        let api = temp.path().join("api");
        fs::create_dir_all(&api).unwrap();
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        fs::write(api.join("api.pid"), child.id().to_string()).unwrap();
        let runner = MockRunner::new();
        let mut printer = MockPrinter::new();

        let result = StopCommand::new(temp.path().to_path_buf(), &runner)
            .execute(&mut printer)
            .unwrap();

        assert!(result.success);
        assert!(!child.wait().unwrap().success());
        assert!(!api.join("api.pid").exists());
        assert!(printer.has_success("Stopped API server"));
    }
}
