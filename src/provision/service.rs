//! Per-service provisioning plans.
//!
//! The three source-built services differ only in data: which repository
//! to clone, which commands install and build it, which env file it reads,
//! how it starts and where its health endpoint lives. [`ServicePlan`]
//! captures that data so one provisioning routine handles all of them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{defaults, EnvFile, ServiceConfig};
use crate::shell::CommandSpec;

/// A service built from source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Api,
    Worker,
    Ui,
}

impl ServiceKind {
    /// Subdirectory and file stem (`api`, `api.log`, `api.pid`).
    pub fn name(self) -> &'static str {
        match self {
            ServiceKind::Api => "api",
            ServiceKind::Worker => "worker",
            ServiceKind::Ui => "ui",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ServiceKind::Api => "API server",
            ServiceKind::Worker => "Worker",
            ServiceKind::Ui => "UI",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command run during provisioning, with the progress line shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub label: String,
    pub command: CommandSpec,
}

impl Stage {
    fn new(label: &str, command: CommandSpec) -> Self {
        Self {
            label: label.to_string(),
            command,
        }
    }
}

/// Health endpoint and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthWait {
    pub url: String,
    pub timeout: Duration,
}

/// Everything needed to provision one service under `dir`.
#[derive(Debug, Clone)]
pub struct ServicePlan {
    pub kind: ServiceKind,
    pub repo_url: String,
    pub dir: PathBuf,
    pub install: Vec<Stage>,
    pub build: Vec<Stage>,
    pub env_file_name: &'static str,
    pub env_file: EnvFile,
    pub launch: CommandSpec,
    /// `None` for services without an HTTP endpoint.
    pub health: Option<HealthWait>,
}

impl ServicePlan {
    /// The API server: Node install + build, `npm start`, `/v1/health`.
    pub fn api(config: &ServiceConfig, token: &str, install_dir: &Path) -> Self {
        let kind = ServiceKind::Api;
        let dir = install_dir.join(kind.name());

        let env_file = EnvFile::new()
            .set("PORT", config.api_port.to_string())
            .set("TEMPORAL_ADDRESS", config.temporal_address())
            .set("TEMPORAL_NAMESPACE", defaults::TEMPORAL_NAMESPACE)
            .set("TEMPORAL_TASK_QUEUE", defaults::TEMPORAL_TASK_QUEUE)
            .set("AWS_REGION", &config.region)
            .set("DYNAMODB_TABLE", &config.dynamodb_table)
            .set_secret("BEARER_TOKEN", token)
            .set("AUTH_MODE", "local");

        Self {
            kind,
            repo_url: config.api_repo_url.clone(),
            install: vec![Stage::new(
                "Installing dependencies...",
                CommandSpec::new("npm", ["install"]).in_dir(&dir),
            )],
            build: vec![Stage::new(
                "Building...",
                CommandSpec::new("npm", ["run", "build"]).in_dir(&dir),
            )],
            env_file_name: ".env",
            env_file,
            launch: CommandSpec::new("npm", ["start"]).in_dir(&dir),
            health: Some(HealthWait {
                url: config.api_health_url(),
                timeout: Duration::from_secs(30),
            }),
            dir,
        }
    }

    /// The worker: Python virtualenv, `python -m worker.main`.
    ///
    /// The worker does not load its `.env` itself, so the same variables
    /// are passed in the process environment.
    pub fn worker(config: &ServiceConfig, token: &str, python: &str, install_dir: &Path) -> Self {
        let kind = ServiceKind::Worker;
        let dir = install_dir.join(kind.name());
        // Resolved against our cwd, since the child runs inside `dir`.
        let venv_bin = std::path::absolute(&dir)
            .unwrap_or_else(|_| dir.clone())
            .join(".venv")
            .join("bin");

        let env_file = EnvFile::new()
            .set("TEMPORAL_ADDRESS", config.temporal_address())
            .set("TEMPORAL_NAMESPACE", defaults::TEMPORAL_NAMESPACE)
            .set("TEMPORAL_TASK_QUEUE", defaults::TEMPORAL_TASK_QUEUE)
            .set("AWS_REGION", &config.region)
            .set("DYNAMODB_TABLE", &config.dynamodb_table)
            .set("DEFAULT_MODEL", &config.model)
            .set_secret("API_BEARER_TOKEN", token);

        let process_env: BTreeMap<String, String> = env_file
            .vars()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let pip = venv_bin.join("pip").display().to_string();
        let venv_python = venv_bin.join("python").display().to_string();

        Self {
            kind,
            repo_url: config.worker_repo_url.clone(),
            install: vec![
                Stage::new(
                    "Creating Python virtual environment...",
                    CommandSpec::new(python, ["-m", "venv", ".venv"]).in_dir(&dir),
                ),
                Stage::new(
                    "Installing Python dependencies...",
                    CommandSpec::new(pip, ["install", "-r", "requirements.txt"]).in_dir(&dir),
                ),
            ],
            build: Vec::new(),
            env_file_name: ".env",
            env_file,
            launch: CommandSpec::new(venv_python, ["-m", "worker.main"])
                .in_dir(&dir)
                .with_env(process_env),
            health: None,
            dir,
        }
    }

    /// The web UI: Node install, `npm run dev` on the UI port, `/`.
    pub fn ui(config: &ServiceConfig, install_dir: &Path) -> Self {
        let kind = ServiceKind::Ui;
        let dir = install_dir.join(kind.name());

        let env_file = EnvFile::new()
            .set("PORT", config.ui_port.to_string())
            .set("NEXT_PUBLIC_API_URL", config.api_url());

        let mut port_env = BTreeMap::new();
        port_env.insert("PORT".to_string(), config.ui_port.to_string());

        Self {
            kind,
            repo_url: config.ui_repo_url.clone(),
            install: vec![Stage::new(
                "Installing dependencies...",
                CommandSpec::new("npm", ["install"]).in_dir(&dir),
            )],
            build: Vec::new(),
            env_file_name: ".env.local",
            env_file,
            launch: CommandSpec::new("npm", ["run", "dev"])
                .in_dir(&dir)
                .with_env(port_env),
            health: Some(HealthWait {
                url: format!("{}/", config.ui_url()),
                timeout: Duration::from_secs(60),
            }),
            dir,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.kind.name()))
    }

    pub fn pid_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pid", self.kind.name()))
    }

    pub fn env_path(&self) -> PathBuf {
        self.dir.join(self.env_file_name)
    }
}
