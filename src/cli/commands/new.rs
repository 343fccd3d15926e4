//! New command implementation.
//!
//! The `reposwarm new` command either provisions the whole local stack
//! (`--local`) or writes the installation guides and optionally hands
//! them to a coding agent.

use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::warn;

use crate::bootstrap::{Orchestrator, SetupOptions, SetupResult};
use crate::cli::args::NewArgs;
use crate::config::{CliConfig, ServiceConfig};
use crate::environment::{Agent, Environment};
use crate::error::{Result, SwarmError};
use crate::guide::{write_guides, GuidePaths, AGENT_GUIDE_FILE};
use crate::health::HealthCheck;
use crate::shell::CommandRunner;
use crate::ui::Printer;

use super::dispatcher::{Command, CommandResult};

/// The new command implementation.
pub struct NewCommand<'a> {
    args: NewArgs,
    env: &'a Environment,
    runner: &'a dyn CommandRunner,
    health: &'a dyn HealthCheck,
    cli_config_path: PathBuf,
}

impl<'a> NewCommand<'a> {
    pub fn new(
        args: NewArgs,
        env: &'a Environment,
        runner: &'a dyn CommandRunner,
        health: &'a dyn HealthCheck,
        cli_config_path: PathBuf,
    ) -> Self {
        Self {
            args,
            env,
            runner,
            health,
            cli_config_path,
        }
    }

    /// The directory the stack or the guides go into.
    ///
    /// A relative `--dir` is taken from the working directory.
    pub fn install_dir(&self) -> PathBuf {
        match &self.args.dir {
            Some(dir) => self.env.work_dir.join(dir),
            None => self.env.install_dir(),
        }
    }

    fn service_config(&self, printer: &mut dyn Printer) -> ServiceConfig {
        let cli = match CliConfig::load_from(&self.cli_config_path) {
            Ok(cli) => cli,
            Err(e) => {
                warn!("Ignoring unreadable CLI config: {}", e);
                printer.warning(&format!("Ignoring unreadable CLI config: {}", e));
                CliConfig::default()
            }
        };
        ServiceConfig::from_cli_config(&cli)
    }

    fn setup_options(&self) -> SetupOptions {
        let mut options = SetupOptions::new(self.install_dir(), &self.cli_config_path);
        for step in &self.args.skip {
            options = options.skip(*step);
        }
        options.verify = !self.args.no_verify;
        options
    }

    /// Run the automated pipeline. Returns the result and whether it succeeded.
    pub fn run_local(&self, printer: &mut dyn Printer) -> (SetupResult, bool) {
        let config = self.service_config(printer);
        let orchestrator = Orchestrator::new(self.env, config, self.runner, self.health);

        match orchestrator.run(&self.setup_options(), printer) {
            Ok(result) => {
                let ok = result.success;
                (result, ok)
            }
            Err(aborted) => (aborted.result, false),
        }
    }

    /// JSON report for guide mode.
    pub fn guide_report(&self, paths: &GuidePaths) -> serde_json::Value {
        let agent = self.env.agent_name();
        json!({
            "environment": self.env,
            "installDir": self.install_dir(),
            "missing": self.env.missing_deps(),
            "agentAvailable": agent.is_some(),
            "agent": agent.unwrap_or_default(),
            "guidePath": paths.guide,
            "agentGuidePath": paths.agent_guide,
        })
    }

    fn execute_local(&self, printer: &mut dyn Printer) -> Result<CommandResult> {
        let (result, ok) = self.run_local(printer);
        if self.args.json {
            println!("{}", to_json(&result)?);
        }
        Ok(if ok {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }

    fn execute_guide(&self, printer: &mut dyn Printer) -> Result<CommandResult> {
        let install_dir = self.install_dir();
        let config = self.service_config(printer);

        if self.args.json {
            let paths = write_guides(self.env, &config, &install_dir)?;
            println!("{}", to_json(&self.guide_report(&paths))?);
            return Ok(CommandResult::success());
        }

        printer.section("RepoSwarm New Installation");
        printer.info("Scanning environment...");
        printer.line(&self.env.summary());

        let missing = self.env.missing_deps();
        if !missing.is_empty() {
            printer.warning("Missing dependencies:");
            for dep in &missing {
                printer.line(&format!("  {}: missing", dep));
            }
        }

        let paths = write_guides(self.env, &config, &install_dir)?;
        printer.success(&format!("Generated {}", paths.guide.display()));
        printer.success(&format!(
            "Generated {} (agent-friendly)",
            paths.agent_guide.display()
        ));

        if self.args.guide_only {
            return Ok(CommandResult::success());
        }

        if let Some(agent) = self.launchable_agent() {
            let launch = self.args.agent
                || printer.confirm(
                    &format!(
                        "{} detected! Use it for interactive installation?",
                        agent.display_name()
                    ),
                    true,
                )?;
            if launch {
                self.launch_agent(agent, &install_dir, &paths.agent_guide, printer)?;
                return Ok(CommandResult::success());
            }
        } else if self.args.agent {
            printer.warning("No supported coding agent found");
        }

        self.print_next_steps(&config, &install_dir, printer);
        Ok(CommandResult::success())
    }

    /// First detected agent that can be started on the guide.
    fn launchable_agent(&self) -> Option<Agent> {
        Agent::PRIORITY
            .into_iter()
            .filter(|a| self.env.has_agent(*a))
            .find(|a| a.launch_command(Path::new("."), Path::new(AGENT_GUIDE_FILE)).is_some())
    }

    fn launch_agent(
        &self,
        agent: Agent,
        install_dir: &Path,
        guide: &Path,
        printer: &mut dyn Printer,
    ) -> Result<()> {
        let spec = agent
            .launch_command(install_dir, guide)
            .ok_or_else(|| anyhow::anyhow!("unsupported agent: {}", agent))?;

        printer.info(&format!("Launching {}...", agent.display_name()));
        let output = self.runner.run_attached(&spec)?;
        if !output.success {
            return Err(SwarmError::CommandFailed {
                command: spec.display(),
                code: output.exit_code,
            });
        }

        printer.success("Agent finished. Verify with: reposwarm status");
        Ok(())
    }

    fn print_next_steps(&self, config: &ServiceConfig, install_dir: &Path, printer: &mut dyn Printer) {
        printer.line("");
        printer.line("Next steps:");
        printer.line(&format!(
            "  1. Review the guide:     {}",
            install_dir.join(crate::guide::GUIDE_FILE).display()
        ));
        printer.line("  2. Follow the steps to start each service");
        printer.line(&format!(
            "  3. Configure the CLI:    reposwarm config set apiUrl {}",
            config.api_base_url()
        ));
        printer.line("  4. Verify:               reposwarm status");
        printer.line("");
        printer.line("  Or use automated setup:  reposwarm new --local");

        let manual = self.env.agent().and_then(|agent| {
            agent
                .manual_command(install_dir, AGENT_GUIDE_FILE)
                .map(|cmd| (agent, cmd))
        });
        if let Some((agent, cmd)) = manual {
            printer.line("");
            printer.line(&format!("  Or let {} do it:", agent.display_name()));
            printer.line(&format!("    {}", cmd));
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("failed to render JSON: {}", e).into())
}

impl Command for NewCommand<'_> {
    fn execute(&self, printer: &mut dyn Printer) -> Result<CommandResult> {
        if self.args.local {
            self.execute_local(printer)
        } else {
            self.execute_guide(printer)
        }
    }
}
