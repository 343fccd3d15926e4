//! Docker Compose manifest for the workflow coordinator.
//!
//! Temporal runs from published images rather than a source checkout:
//! Postgres for persistence, the auto-setup server, and the web UI. The
//! server waits for Postgres to pass its health check before starting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{defaults, ServiceConfig};
use crate::error::Result;
use crate::shell::CommandSpec;

/// Name of the compose file written under `<install>/temporal/`.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

/// Named volume holding Postgres data.
pub const DATA_VOLUME: &str = "temporal-data";

/// Top-level compose document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeFile {
    pub services: BTreeMap<String, ComposeService>,
    #[serde(default)]
    pub volumes: BTreeMap<String, serde_yaml::Value>,
}

/// One container definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeService {
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<Healthcheck>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, DependsOn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Healthcheck {
    pub test: Vec<String>,
    pub interval: String,
    pub timeout: String,
    pub retries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependsOn {
    pub condition: String,
}

impl DependsOn {
    fn healthy() -> Self {
        Self {
            condition: "service_healthy".to_string(),
        }
    }

    fn started() -> Self {
        Self {
            condition: "service_started".to_string(),
        }
    }
}

fn env<const N: usize>(pairs: [(&str, &str); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl ComposeFile {
    /// The Temporal stack for the configured ports.
    pub fn temporal(config: &ServiceConfig) -> Self {
        let mut services = BTreeMap::new();

        services.insert(
            "postgres".to_string(),
            ComposeService {
                image: "postgres:16-alpine".to_string(),
                ports: vec![format!("{0}:{0}", defaults::POSTGRES_PORT)],
                environment: env([
                    ("POSTGRES_USER", "temporal"),
                    ("POSTGRES_PASSWORD", "temporal"),
                ]),
                healthcheck: Some(Healthcheck {
                    test: vec!["CMD-SHELL".to_string(), "pg_isready -U temporal".to_string()],
                    interval: "5s".to_string(),
                    timeout: "5s".to_string(),
                    retries: 10,
                }),
                volumes: vec![format!("{}:/var/lib/postgresql/data", DATA_VOLUME)],
                depends_on: BTreeMap::new(),
            },
        );

        services.insert(
            "temporal".to_string(),
            ComposeService {
                image: "temporalio/auto-setup:latest".to_string(),
                ports: vec![format!("{}:7233", config.temporal_port)],
                environment: env([
                    ("DB", "postgres12"),
                    ("POSTGRES_USER", "temporal"),
                    ("POSTGRES_PWD", "temporal"),
                    ("POSTGRES_SEEDS", "postgres"),
                    (
                        "DYNAMIC_CONFIG_FILE_PATH",
                        "config/dynamicconfig/development-sql.yaml",
                    ),
                    ("SKIP_DEFAULT_NAMESPACE_CREATION", "false"),
                ]),
                healthcheck: None,
                volumes: Vec::new(),
                depends_on: BTreeMap::from([("postgres".to_string(), DependsOn::healthy())]),
            },
        );

        services.insert(
            "temporal-ui".to_string(),
            ComposeService {
                image: "temporalio/ui:latest".to_string(),
                ports: vec![format!("{}:8080", config.temporal_ui_port)],
                environment: env([("TEMPORAL_ADDRESS", "temporal:7233")]),
                healthcheck: None,
                volumes: Vec::new(),
                depends_on: BTreeMap::from([("temporal".to_string(), DependsOn::started())]),
            },
        );

        Self {
            services,
            volumes: BTreeMap::from([(DATA_VOLUME.to_string(), serde_yaml::Value::Null)]),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| anyhow::anyhow!("failed to render compose file: {}", e).into())
    }
}

/// `docker compose up -d`.
pub fn up_command() -> CommandSpec {
    CommandSpec::new("docker", ["compose", "up", "-d"])
}

/// `docker compose ps` with one `name<TAB>status` line per container.
pub fn ps_command() -> CommandSpec {
    CommandSpec::new("docker", ["compose", "ps", "--format", "{{.Name}}\t{{.Status}}"])
}

/// `docker compose down`.
pub fn down_command() -> CommandSpec {
    CommandSpec::new("docker", ["compose", "down"])
}
