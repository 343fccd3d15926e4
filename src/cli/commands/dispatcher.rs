//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::config::{CliConfig, ServiceConfig};
use crate::environment::Environment;
use crate::error::Result;
use crate::health::HttpProbe;
use crate::shell::SystemRunner;
use crate::ui::Printer;

use super::doctor::DoctorCommand;
use super::new::NewCommand;
use super::stop::StopCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command, writing human output to `printer`.
    fn execute(&self, printer: &mut dyn Printer) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    work_dir: PathBuf,
}

impl CommandDispatcher {
    /// Create a dispatcher resolving default paths against `work_dir`.
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Dispatch and execute a command against the real machine.
    pub fn dispatch(&self, cli: &Cli, printer: &mut dyn Printer) -> Result<CommandResult> {
        let runner = SystemRunner;

        match &cli.command {
            Commands::New(args) => {
                let env = self.detect();
                let probe = HttpProbe::new()?;
                let cmd = NewCommand::new(
                    args.clone(),
                    &env,
                    &runner,
                    &probe,
                    CliConfig::default_path()?,
                );
                cmd.execute(printer)
            }
            Commands::Doctor(args) => {
                let env = self.detect();
                let probe = HttpProbe::new()?;
                let cli_config = CliConfig::load().unwrap_or_else(|e| {
                    debug!("Using default CLI config: {}", e);
                    CliConfig::default()
                });
                let cmd = DoctorCommand::new(
                    args.clone(),
                    &env,
                    &probe,
                    ServiceConfig::from_cli_config(&cli_config),
                );
                cmd.execute(printer)
            }
            Commands::Stop(args) => {
                let dir = args
                    .dir
                    .clone()
                    .unwrap_or_else(|| self.default_install_dir());
                let cmd = StopCommand::new(dir, &runner);
                cmd.execute(printer)
            }
        }
    }

    fn detect(&self) -> Environment {
        let mut env = Environment::detect();
        env.work_dir = self.work_dir.clone();
        env
    }

    fn default_install_dir(&self) -> PathBuf {
        self.work_dir.join(crate::config::defaults::INSTALL_DIR_NAME)
    }
}
