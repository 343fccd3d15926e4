//! Resolved settings for the local stack.

use serde::Serialize;

use super::cli_config::CliConfig;
use super::defaults;

/// Immutable settings threaded through every provisioning call.
///
/// Built once per run from [`defaults`] and the local-setup overrides in
/// the CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub worker_repo_url: String,
    pub api_repo_url: String,
    pub ui_repo_url: String,
    pub dynamodb_table: String,
    pub model: String,
    pub temporal_port: u16,
    pub temporal_ui_port: u16,
    pub api_port: u16,
    pub ui_port: u16,
    pub region: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            worker_repo_url: defaults::WORKER_REPO_URL.to_string(),
            api_repo_url: defaults::API_REPO_URL.to_string(),
            ui_repo_url: defaults::UI_REPO_URL.to_string(),
            dynamodb_table: defaults::DYNAMODB_TABLE.to_string(),
            model: defaults::MODEL.to_string(),
            temporal_port: defaults::TEMPORAL_PORT,
            temporal_ui_port: defaults::TEMPORAL_UI_PORT,
            api_port: defaults::API_PORT,
            ui_port: defaults::UI_PORT,
            region: defaults::REGION.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Apply the overrides present in `cli` on top of the defaults.
    pub fn from_cli_config(cli: &CliConfig) -> Self {
        let base = Self::default();
        let pick = |value: &Option<String>, fallback: String| {
            value
                .as_ref()
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or(fallback)
        };

        Self {
            worker_repo_url: pick(&cli.worker_repo_url, base.worker_repo_url),
            api_repo_url: pick(&cli.api_repo_url, base.api_repo_url),
            ui_repo_url: pick(&cli.ui_repo_url, base.ui_repo_url),
            dynamodb_table: pick(&cli.dynamodb_table, base.dynamodb_table),
            model: if cli.default_model.is_empty() {
                base.model
            } else {
                cli.default_model.clone()
            },
            temporal_port: cli.temporal_port.unwrap_or(base.temporal_port),
            temporal_ui_port: cli.temporal_ui_port.unwrap_or(base.temporal_ui_port),
            api_port: cli.api_port.unwrap_or(base.api_port),
            ui_port: cli.ui_port.unwrap_or(base.ui_port),
            region: if cli.region.is_empty() {
                base.region
            } else {
                cli.region.clone()
            },
        }
    }

    /// `localhost:<port>` address of the Temporal frontend.
    pub fn temporal_address(&self) -> String {
        format!("localhost:{}", self.temporal_port)
    }

    /// Temporal web UI.
    pub fn temporal_ui_url(&self) -> String {
        format!("http://localhost:{}", self.temporal_ui_port)
    }

    /// Endpoint that answers once Temporal has its namespaces loaded.
    pub fn temporal_health_url(&self) -> String {
        format!("{}/api/v1/namespaces", self.temporal_ui_url())
    }

    /// API server root.
    pub fn api_url(&self) -> String {
        format!("http://localhost:{}", self.api_port)
    }

    /// Versioned API base the CLI talks to.
    pub fn api_base_url(&self) -> String {
        format!("{}/v1", self.api_url())
    }

    /// API health endpoint.
    pub fn api_health_url(&self) -> String {
        format!("{}/v1/health", self.api_url())
    }

    /// Web UI root.
    pub fn ui_url(&self) -> String {
        format!("http://localhost:{}", self.ui_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_builtin_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.ui_port, 3001);
        assert_eq!(config.temporal_port, 7233);
        assert_eq!(config.dynamodb_table, "reposwarm-cache");
    }

    #[test]
    fn cli_overrides_win() {
        let cli = CliConfig {
            api_port: Some(4000),
            ui_repo_url: Some("https://example.com/ui.git".to_string()),
            dynamodb_table: Some(String::new()),
            region: "eu-west-1".to_string(),
            ..Default::default()
        };
        let config = ServiceConfig::from_cli_config(&cli);
        assert_eq!(config.api_port, 4000);
        assert_eq!(config.ui_repo_url, "https://example.com/ui.git");
        assert_eq!(config.dynamodb_table, "reposwarm-cache");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.ui_port, 3001);
    }

    #[test]
    fn urls_follow_ports() {
        let config = ServiceConfig {
            api_port: 4000,
            temporal_ui_port: 9000,
            ..Default::default()
        };
        assert_eq!(config.api_health_url(), "http://localhost:4000/v1/health");
        assert_eq!(config.api_base_url(), "http://localhost:4000/v1");
        assert_eq!(
            config.temporal_health_url(),
            "http://localhost:9000/api/v1/namespaces"
        );
        assert_eq!(config.temporal_address(), "localhost:7233");
    }
}
