//! Doctor command implementation.
//!
//! The `reposwarm doctor` command shows the detected environment, which
//! prerequisites are missing and whether local services answer.

use serde::Serialize;
use serde_json::json;

use crate::cli::args::DoctorArgs;
use crate::config::ServiceConfig;
use crate::environment::Environment;
use crate::error::Result;
use crate::health::{is_healthy_status, HealthCheck};
use crate::ui::Printer;

use super::dispatcher::{Command, CommandResult};

/// Reachability of one local service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCheck {
    pub name: &'static str,
    pub url: String,
    /// `ok`, `down` or `HTTP <n>`.
    pub status: String,
}

impl ServiceCheck {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// The doctor command implementation.
pub struct DoctorCommand<'a> {
    args: DoctorArgs,
    env: &'a Environment,
    health: &'a dyn HealthCheck,
    config: ServiceConfig,
}

impl<'a> DoctorCommand<'a> {
    pub fn new(
        args: DoctorArgs,
        env: &'a Environment,
        health: &'a dyn HealthCheck,
        config: ServiceConfig,
    ) -> Self {
        Self {
            args,
            env,
            health,
            config,
        }
    }

    /// Probe each local service once.
    pub fn check_services(&self) -> Vec<ServiceCheck> {
        let targets = [
            ("Temporal", self.config.temporal_health_url()),
            ("API", self.config.api_health_url()),
            ("UI", format!("{}/", self.config.ui_url())),
        ];
        targets
            .into_iter()
            .map(|(name, url)| {
                let status = match self.health.check(&url) {
                    Ok(code) if is_healthy_status(code) => "ok".to_string(),
                    Ok(code) => format!("HTTP {}", code),
                    Err(_) => "down".to_string(),
                };
                ServiceCheck { name, url, status }
            })
            .collect()
    }

    pub fn report(&self, services: &[ServiceCheck]) -> serde_json::Value {
        json!({
            "environment": self.env,
            "missing": self.env.missing_deps(),
            "agent": self.env.agent_name().unwrap_or_default(),
            "services": services,
        })
    }
}

impl Command for DoctorCommand<'_> {
    fn execute(&self, printer: &mut dyn Printer) -> Result<CommandResult> {
        let services = self.check_services();

        if self.args.json {
            let out = serde_json::to_string_pretty(&self.report(&services))
                .map_err(|e| anyhow::anyhow!("failed to render JSON: {}", e))?;
            println!("{}", out);
            return Ok(CommandResult::success());
        }

        printer.section("RepoSwarm Doctor");
        printer.line(&self.env.summary());

        let missing = self.env.missing_deps();
        if missing.is_empty() {
            printer.success("All prerequisites found");
        } else {
            printer.warning(&format!("Missing prerequisites: {}", missing.join(", ")));
        }

        printer.line("  Local services:");
        for check in &services {
            let mark = if check.is_ok() { '✓' } else { '✗' };
            printer.line(&format!(
                "    {} {} ({}): {}",
                mark, check.name, check.url, check.status
            ));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ToolStatus;
    use crate::health::MockHealth;
    use crate::ui::MockPrinter;

    fn doctor<'a>(env: &'a Environment, health: &'a MockHealth) -> DoctorCommand<'a> {
        DoctorCommand::new(DoctorArgs::default(), env, health, ServiceConfig::default())
    }

    #[test]
    fn classifies_service_statuses() {
        let env = Environment::default();
        let health = MockHealth::new();
        health.set_status("http://localhost:3000/v1/health", 503);
        health.set_unreachable("http://localhost:3001/");

        let checks = doctor(&env, &health).check_services();

        let statuses: Vec<_> = checks.iter().map(|c| c.status.as_str()).collect();
        assert_eq!(statuses, vec!["ok", "HTTP 503", "down"]);
        assert_eq!(checks[0].url, "http://localhost:8233/api/v1/namespaces");
    }

    #[test]
    fn warns_about_missing_prerequisites() {
        let env = Environment {
            git: ToolStatus::found("2.43.0"),
            ..Default::default()
        };
        let health = MockHealth::new();
        let mut printer = MockPrinter::new();

        let result = doctor(&env, &health).execute(&mut printer).unwrap();

        assert!(result.success);
        assert!(printer.has_warning("docker, docker-compose"));
        assert!(!printer.has_warning("git"));
        assert!(printer.has_line("✓ API"));
    }

    #[test]
    fn report_names_agent() {
        let env = Environment {
            has_aider: true,
            ..Default::default()
        };
        let health = MockHealth::new();
        let cmd = doctor(&env, &health);

        let report = cmd.report(&cmd.check_services());

        assert_eq!(report["agent"], "aider");
        assert_eq!(report["services"][1]["name"], "API");
        assert_eq!(report["environment"]["hasAider"], true);
    }
}
