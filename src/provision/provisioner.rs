//! The fetch, install, configure, launch and await-health sequence.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use super::compose::{self, ComposeFile, COMPOSE_FILE_NAME};
use super::process::ProcessHandle;
use super::service::ServicePlan;
use crate::config::{write_with_mode, ServiceConfig};
use crate::error::{Result, SwarmError};
use crate::health::HealthCheck;
use crate::shell::{CommandRunner, CommandSpec};
use crate::ui::Printer;

/// How long Temporal gets to load its namespaces.
pub const TEMPORAL_READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Lines of command output kept in error messages.
const OUTPUT_TAIL_LINES: usize = 20;

/// Runs provisioning against a [`CommandRunner`] and a [`HealthCheck`].
pub struct Provisioner<'a> {
    runner: &'a dyn CommandRunner,
    health: &'a dyn HealthCheck,
}

impl<'a> Provisioner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, health: &'a dyn HealthCheck) -> Self {
        Self { runner, health }
    }

    /// Start the Temporal stack with Docker Compose and wait until it serves.
    pub fn provision_temporal(
        &self,
        config: &ServiceConfig,
        install_dir: &Path,
        printer: &mut dyn Printer,
    ) -> Result<()> {
        let temporal_dir = install_dir.join("temporal");
        fs::create_dir_all(&temporal_dir)?;

        let yaml = ComposeFile::temporal(config).to_yaml()?;
        write_with_mode(&temporal_dir.join(COMPOSE_FILE_NAME), yaml.as_bytes(), 0o644)?;
        printer.info(&format!("Wrote {}", COMPOSE_FILE_NAME));

        let up = compose::up_command().in_dir(&temporal_dir);
        self.run_stage(&up, |message| SwarmError::LaunchFailed {
            service: "temporal".to_string(),
            message: format!("docker compose up failed: {}", message),
        })?;
        printer.info("Docker containers starting...");

        printer.info("Waiting for Temporal to be ready (this may take up to 60s)...");
        if let Err(err) = self
            .health
            .wait_for_http(&config.temporal_health_url(), TEMPORAL_READY_TIMEOUT)
        {
            let status = self
                .runner
                .run(&compose::ps_command().in_dir(&temporal_dir))
                .map(|out| out.output)
                .unwrap_or_default();
            return Err(SwarmError::LaunchFailed {
                service: "temporal".to_string(),
                message: format!("not ready: {}\nContainer status:\n{}", err, status.trim_end()),
            });
        }

        printer.success("Temporal is ready");
        Ok(())
    }

    /// Fetch, install, build, write the env file and launch.
    ///
    /// Returns once the process is spawned; see [`await_health`](Self::await_health).
    pub fn start(&self, plan: &ServicePlan, printer: &mut dyn Printer) -> Result<ProcessHandle> {
        let service = plan.kind.name();
        let display = plan.kind.display_name();

        self.fetch(plan, printer)?;

        for stage in &plan.install {
            printer.info(&stage.label);
            self.run_stage(&stage.command, |message| SwarmError::InstallFailed {
                service: service.to_string(),
                message,
            })?;
        }

        for stage in &plan.build {
            printer.info(&stage.label);
            self.run_stage(&stage.command, |message| SwarmError::BuildFailed {
                service: service.to_string(),
                message,
            })?;
        }

        plan.env_file.write(&plan.env_path())?;
        debug!("Wrote {}", plan.env_path().display());

        printer.info(&format!("Starting {}...", display));
        let handle = self.launch(plan)?;
        info!("{} started (pid {})", service, handle.pid);
        Ok(handle)
    }

    /// Wait on the plan's health endpoint, if it has one.
    pub fn await_health(&self, plan: &ServicePlan, printer: &mut dyn Printer) -> Result<()> {
        let display = plan.kind.display_name();
        match &plan.health {
            Some(wait) => {
                printer.info(&format!("Waiting for {} to be ready...", display));
                self.health.wait_for_http(&wait.url, wait.timeout)?;
                printer.success(&format!("{} is ready", display));
            }
            None => printer.success(&format!("{} started", display)),
        }
        Ok(())
    }

    /// Clone the repository unless the service directory already exists.
    fn fetch(&self, plan: &ServicePlan, printer: &mut dyn Printer) -> Result<()> {
        let service = plan.kind.name();
        if plan.dir.exists() {
            printer.info(&format!(
                "{} directory exists, skipping clone",
                plan.kind.display_name()
            ));
            return Ok(());
        }

        printer.info(&format!("Cloning {}...", plan.kind.display_name()));
        let install_dir = plan.dir.parent().unwrap_or(&plan.dir);
        let clone =
            CommandSpec::new("git", ["clone", plan.repo_url.as_str(), service]).in_dir(install_dir);
        self.run_stage(&clone, |message| SwarmError::FetchFailed {
            service: service.to_string(),
            message,
        })
    }

    fn launch(&self, plan: &ServicePlan) -> Result<ProcessHandle> {
        let service = plan.kind.name();
        let launch_err = |message: String| SwarmError::LaunchFailed {
            service: service.to_string(),
            message,
        };

        let log_path = plan.log_path();
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| launch_err(format!("creating {}: {}", log_path.display(), e)))?;

        let pid = self
            .runner
            .spawn_detached(&plan.launch, log)
            .map_err(|e| launch_err(e.to_string()))?;

        let handle = ProcessHandle::new(service, pid, log_path, plan.pid_path());
        handle.write_pid_file()?;
        Ok(handle)
    }

    /// Run a foreground command; a spawn error or non-zero exit becomes `classify(detail)`.
    fn run_stage<F>(&self, spec: &CommandSpec, classify: F) -> Result<()>
    where
        F: Fn(String) -> SwarmError,
    {
        let output = self
            .runner
            .run(spec)
            .map_err(|e| classify(e.to_string()))?;

        if output.success {
            debug!("{} finished in {:?}", spec.display(), output.duration);
            return Ok(());
        }

        let code = output
            .exit_code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        Err(classify(format!(
            "`{}` exited with {}\n{}",
            spec.display(),
            code,
            output.tail(OUTPUT_TAIL_LINES)
        )))
    }
}
