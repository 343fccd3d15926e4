//! The local setup pipeline.
//!
//! [`Orchestrator::run`] executes the eight steps of
//! [`SetupStep::ALL`] strictly in order. A failed critical step stops the
//! run and returns [`SetupAborted`] with everything recorded so far; a
//! failed advisory step is recorded, reported as a warning and the run
//! continues.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::result::{SetupAborted, SetupResult};
use super::step::{SetupStep, StepResult, StepStatus};
use crate::config::{CliConfig, ServiceConfig};
use crate::environment::Environment;
use crate::error::{Result, SwarmError};
use crate::health::{is_healthy_status, HealthCheck};
use crate::provision::{Provisioner, ServicePlan};
use crate::shell::CommandRunner;
use crate::ui::Printer;

/// Bytes of randomness in the bearer token.
pub const TOKEN_BYTES: usize = 32;

/// Generate a fresh bearer token: 32 random bytes, lowercase hex.
pub fn generate_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow::anyhow!("failed to generate token: {}", e))?;
    Ok(hex::encode(bytes))
}

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum SetupProgress<'a> {
    /// A step is about to start.
    StepStarting {
        step: SetupStep,
        index: usize,
        total: usize,
    },
    /// A step reached a terminal state.
    StepFinished {
        step: SetupStep,
        result: &'a StepResult,
    },
}

/// Options for a setup run.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Root of the local stack.
    pub install_dir: PathBuf,
    /// Where the CLI configuration is written.
    pub cli_config_path: PathBuf,
    /// Skippable steps to leave out.
    pub skip: HashSet<SetupStep>,
    /// Run the final verification pass.
    pub verify: bool,
}

impl SetupOptions {
    pub fn new(install_dir: impl Into<PathBuf>, cli_config_path: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            cli_config_path: cli_config_path.into(),
            skip: HashSet::new(),
            verify: true,
        }
    }

    /// Leave out `step`. Steps that cannot be skipped are ignored.
    pub fn skip(mut self, step: SetupStep) -> Self {
        if step.is_skippable() {
            self.skip.insert(step);
        }
        self
    }

    pub fn skips(&self, step: SetupStep) -> bool {
        self.skip.contains(&step) || (step == SetupStep::Verify && !self.verify)
    }
}

/// Records step outcomes and fans them out to the printer and callback.
struct Tracker<'p> {
    result: SetupResult,
    printer: &'p mut dyn Printer,
    on_progress: &'p mut dyn for<'r> FnMut(SetupProgress<'r>),
    index: usize,
}

impl Tracker<'_> {
    fn start(&mut self, step: SetupStep) {
        self.index += 1;
        info!("Step {}/{}: {}", self.index, SetupStep::ALL.len(), step);
        (self.on_progress)(SetupProgress::StepStarting {
            step,
            index: self.index,
            total: SetupStep::ALL.len(),
        });
        self.printer.section(step.title());
    }

    fn record(&mut self, step: SetupStep, status: StepStatus, message: String) {
        self.result
            .steps
            .push(StepResult::new(step, status, message));
        if let Some(result) = self.result.steps.last() {
            (self.on_progress)(SetupProgress::StepFinished { step, result });
        }
    }

    /// Record `outcome`. A critical failure comes back as the step-wrapped
    /// error; an advisory one is reported and swallowed.
    fn finish(&mut self, step: SetupStep, outcome: Result<String>) -> Result<()> {
        match outcome {
            Ok(message) => {
                self.record(step, StepStatus::Ok, message);
                Ok(())
            }
            Err(err) => {
                self.record(step, StepStatus::Fail, err.to_string());
                if step.is_critical() {
                    return Err(err.in_step(step.name()));
                }
                warn!("{} failed: {}", step, err);
                let warning = match step.degraded_hint() {
                    Some(hint) => format!("{} setup failed: {} ({})", step.display_name(), err, hint),
                    None => format!("{} failed: {}", step.display_name(), err),
                };
                self.printer.warning(&warning);
                Ok(())
            }
        }
    }

    fn skip(&mut self, step: SetupStep) {
        info!("Skipping {}", step);
        self.printer.info("Skipped");
        self.record(step, StepStatus::Skip, "skipped".to_string());
    }
}

/// Drives the setup pipeline.
pub struct Orchestrator<'a> {
    env: &'a Environment,
    config: ServiceConfig,
    runner: &'a dyn CommandRunner,
    health: &'a dyn HealthCheck,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        env: &'a Environment,
        config: ServiceConfig,
        runner: &'a dyn CommandRunner,
        health: &'a dyn HealthCheck,
    ) -> Self {
        Self {
            env,
            config,
            runner,
            health,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run every step.
    pub fn run(
        &self,
        options: &SetupOptions,
        printer: &mut dyn Printer,
    ) -> std::result::Result<SetupResult, SetupAborted> {
        self.run_with_progress(options, printer, |_| {})
    }

    /// Run every step with a progress callback.
    pub fn run_with_progress(
        &self,
        options: &SetupOptions,
        printer: &mut dyn Printer,
        mut on_progress: impl FnMut(SetupProgress<'_>),
    ) -> std::result::Result<SetupResult, SetupAborted> {
        let mut tracker = Tracker {
            result: SetupResult::new(options.install_dir.clone()),
            printer,
            on_progress: &mut on_progress,
            index: 0,
        };

        match self.drive(options, &mut tracker) {
            Ok(()) => {
                tracker.result.success = tracker.result.critical_path_ok();
                self.print_summary(&tracker.result, options, tracker.printer);
                Ok(tracker.result)
            }
            Err(error) => {
                tracker.printer.error(&error.to_string());
                Err(SetupAborted {
                    result: tracker.result,
                    error,
                })
            }
        }
    }

    fn drive(&self, options: &SetupOptions, t: &mut Tracker<'_>) -> Result<()> {
        let install_dir = options.install_dir.as_path();

        t.start(SetupStep::Prerequisites);
        let outcome = self.check_prerequisites(t.printer);
        t.finish(SetupStep::Prerequisites, outcome)?;

        t.start(SetupStep::Directories);
        let outcome = generate_token().and_then(|token| {
            fs::create_dir_all(install_dir)?;
            t.result.token = token;
            t.printer
                .success(&format!("Install directory: {}", install_dir.display()));
            Ok(install_dir.display().to_string())
        });
        t.finish(SetupStep::Directories, outcome)?;
        let token = t.result.token.clone();

        let provisioner = Provisioner::new(self.runner, self.health);

        t.start(SetupStep::Temporal);
        let outcome = provisioner
            .provision_temporal(&self.config, install_dir, t.printer)
            .map(|()| self.config.temporal_ui_url());
        t.finish(SetupStep::Temporal, outcome)?;

        t.start(SetupStep::Api);
        let plan = ServicePlan::api(&self.config, &token, install_dir);
        let outcome = self.provision_service(&provisioner, &plan, t);
        t.finish(SetupStep::Api, outcome.map(|()| self.config.api_url()))?;

        t.start(SetupStep::Worker);
        if options.skips(SetupStep::Worker) {
            t.skip(SetupStep::Worker);
        } else {
            let plan = ServicePlan::worker(
                &self.config,
                &token,
                self.env.python_program(),
                install_dir,
            );
            let outcome = self.provision_service(&provisioner, &plan, t);
            t.finish(SetupStep::Worker, outcome.map(|()| String::new()))?;
        }

        t.start(SetupStep::Ui);
        if options.skips(SetupStep::Ui) {
            t.skip(SetupStep::Ui);
        } else {
            let plan = ServicePlan::ui(&self.config, install_dir);
            let outcome = self.provision_service(&provisioner, &plan, t);
            t.finish(SetupStep::Ui, outcome.map(|()| self.config.ui_url()))?;
        }

        t.start(SetupStep::CliConfig);
        let outcome = self.configure_cli(&options.cli_config_path, &token);
        if outcome.is_ok() {
            t.printer.success("CLI configured for local API");
        }
        t.finish(SetupStep::CliConfig, outcome)?;

        t.start(SetupStep::Verify);
        if options.skips(SetupStep::Verify) {
            t.skip(SetupStep::Verify);
        } else {
            let include_ui = t.result.status_of(SetupStep::Ui) != Some(StepStatus::Skip);
            let (status, message) = self.verify(include_ui, t.printer);
            t.record(SetupStep::Verify, status, message);
        }

        Ok(())
    }

    fn check_prerequisites(&self, printer: &mut dyn Printer) -> Result<String> {
        let missing = self.env.missing_deps();
        if missing.is_empty() {
            printer.success("All prerequisites found");
            return Ok(String::new());
        }
        for dep in &missing {
            printer.error(&format!("Missing: {}", dep));
        }
        Err(SwarmError::PrerequisitesMissing { missing })
    }

    /// Start the service and wait for it; the handle is kept even when the
    /// health wait fails so the process can still be stopped.
    fn provision_service(
        &self,
        provisioner: &Provisioner<'_>,
        plan: &ServicePlan,
        t: &mut Tracker<'_>,
    ) -> Result<()> {
        let handle = provisioner.start(plan, t.printer)?;
        t.result.processes.push(handle);
        provisioner.await_health(plan, t.printer)
    }

    /// Point the CLI at the local API, keeping unrelated settings.
    fn configure_cli(&self, path: &Path, token: &str) -> Result<String> {
        let mut cli = match CliConfig::load_from(path) {
            Ok(existing) => existing,
            Err(e) => {
                warn!("Replacing unreadable CLI config: {}", e);
                CliConfig::default()
            }
        };

        cli.api_url = self.config.api_base_url();
        cli.api_token = token.to_string();
        cli.default_model = self.config.model.clone();
        cli.region = self.config.region.clone();
        cli.save_to(path)?;

        Ok(path.display().to_string())
    }

    /// Probe every service once. Only Temporal and the API decide the status.
    fn verify(&self, include_ui: bool, printer: &mut dyn Printer) -> (StepStatus, String) {
        let mut checks = vec![
            ("Temporal", self.config.temporal_health_url(), true),
            ("API", self.config.api_health_url(), true),
        ];
        if include_ui {
            checks.push(("UI", format!("{}/", self.config.ui_url()), false));
        }

        let mut critical_ok = true;
        let mut messages = Vec::with_capacity(checks.len());

        for (name, url, critical) in checks {
            let healthy = match self.health.check(&url) {
                Ok(status) if is_healthy_status(status) => {
                    printer.success(&format!("{}: healthy", name));
                    messages.push(format!("{}: ok", name));
                    true
                }
                Ok(status) => {
                    printer.warning(&format!("{}: HTTP {}", name, status));
                    messages.push(format!("{}: HTTP {}", name, status));
                    false
                }
                Err(e) => {
                    printer.warning(&format!("{}: not responding ({})", name, e));
                    messages.push(format!("{}: fail", name));
                    false
                }
            };
            if critical && !healthy {
                critical_ok = false;
            }
        }

        let status = if critical_ok {
            StepStatus::Ok
        } else {
            StepStatus::Fail
        };
        (status, messages.join("; "))
    }

    fn print_summary(&self, result: &SetupResult, options: &SetupOptions, printer: &mut dyn Printer) {
        printer.section("Setup Complete");
        if result.success {
            printer.success("RepoSwarm local environment is running!");
        } else {
            printer.warning("RepoSwarm started with some issues (see above)");
        }

        printer.line("");
        printer.line(&format!("  Temporal UI:  {}", self.config.temporal_ui_url()));
        printer.line(&format!("  API Server:   {}", self.config.api_url()));
        if !options.skips(SetupStep::Ui) {
            printer.line(&format!("  UI:           {}", self.config.ui_url()));
        }
        printer.line("");
        printer.line(&format!("  API Token:    {}", result.token));
        printer.line(&format!(
            "  Logs:         {}/*/*.log",
            result.install_dir.display()
        ));
        printer.line("");
        printer.line("  Try:");
        printer.line("    reposwarm status");
        printer.line(
            "    reposwarm repos add is-odd --url https://github.com/jonschlinkert/is-odd --source GitHub",
        );
        printer.line("    reposwarm investigate is-odd");
        printer.line("");
    }
}
