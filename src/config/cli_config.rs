//! Persisted CLI configuration (`~/.reposwarm/config.json`).
//!
//! The bootstrap writes this file as its last critical step so the CLI
//! talks to the stack it just built. Keys this crate does not know about
//! are carried through a load/save cycle untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::defaults;
use super::env_file::write_with_mode;
use crate::error::{Result, SwarmError};

/// Environment variable overriding the API URL.
pub const API_URL_ENV: &str = "REPOSWARM_API_URL";

/// Environment variable overriding the API token.
pub const API_TOKEN_ENV: &str = "REPOSWARM_API_TOKEN";

/// CLI configuration file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Base URL of the RepoSwarm API.
    #[serde(default)]
    pub api_url: String,

    /// Bearer token sent to the API.
    #[serde(default)]
    pub api_token: String,

    /// Cloud region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Model used for investigations.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Investigation chunk size.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// `pretty` or `json`.
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Local setup: worker repository override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_repo_url: Option<String>,

    /// Local setup: API repository override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_repo_url: Option<String>,

    /// Local setup: UI repository override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_repo_url: Option<String>,

    /// Local setup: storage table override.
    #[serde(
        default,
        rename = "dynamodbTable",
        skip_serializing_if = "Option::is_none"
    )]
    pub dynamodb_table: Option<String>,

    /// Local setup: Temporal RPC port override.
    #[serde(
        default,
        deserialize_with = "port_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub temporal_port: Option<u16>,

    /// Local setup: Temporal UI port override.
    #[serde(
        default,
        deserialize_with = "port_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub temporal_ui_port: Option<u16>,

    /// Local setup: API port override.
    #[serde(
        default,
        deserialize_with = "port_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_port: Option<u16>,

    /// Local setup: UI port override.
    #[serde(
        default,
        deserialize_with = "port_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub ui_port: Option<u16>,

    /// Keys written by other tools or newer versions.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_region() -> String {
    defaults::REGION.to_string()
}

fn default_model() -> String {
    defaults::MODEL.to_string()
}

fn default_chunk_size() -> u32 {
    defaults::CHUNK_SIZE
}

fn default_output_format() -> String {
    defaults::OUTPUT_FORMAT.to_string()
}

/// Ports were historically stored as strings; accept both forms.
fn port_opt<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Num(u16),
        Text(String),
    }

    match Option::<Port>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Port::Num(n)) => Ok(Some(n)),
        Some(Port::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Port::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {s}"))),
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: format!("http://localhost:{}/v1", defaults::API_PORT),
            api_token: String::new(),
            region: default_region(),
            default_model: default_model(),
            chunk_size: default_chunk_size(),
            output_format: default_output_format(),
            worker_repo_url: None,
            api_repo_url: None,
            ui_repo_url: None,
            dynamodb_table: None,
            temporal_port: None,
            temporal_ui_port: None,
            api_port: None,
            ui_port: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl CliConfig {
    /// The config directory (`~/.reposwarm`).
    pub fn default_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".reposwarm"))
            .ok_or_else(|| anyhow::anyhow!("could not determine home directory").into())
    }

    /// The config file path (`~/.reposwarm/config.json`).
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::default_dir()?.join("config.json"))
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!("failed to parse config at {}: {}", path.display(), e).into()
        })
    }

    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key));
        Ok(config)
    }

    /// Apply `REPOSWARM_API_URL` / `REPOSWARM_API_TOKEN` through `env_fn`.
    pub fn apply_env_overrides<F>(&mut self, env_fn: F)
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        if let Ok(url) = env_fn(API_URL_ENV) {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(token) = env_fn(API_TOKEN_ENV) {
            if !token.is_empty() {
                self.api_token = token;
            }
        }
    }

    /// Save as pretty JSON: directory 0700, file 0600.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let to_err = |message: String| SwarmError::ConfigWriteFailed {
            path: path.to_path_buf(),
            message,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| to_err(e.to_string()))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
                    .map_err(|e| to_err(e.to_string()))?;
            }
        }

        let mut json = serde_json::to_string_pretty(self).map_err(|e| to_err(e.to_string()))?;
        json.push('\n');
        write_with_mode(path, json.as_bytes(), 0o600)
    }

    /// Token with all but the last four characters hidden.
    pub fn masked_token(&self) -> String {
        mask_token(&self.api_token)
    }
}

/// Hide all but the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        return "***".to_string();
    }
    format!("{}{}", "*".repeat(token.len() - 4), &token[token.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_local_api() {
        let config = CliConfig::default();
        assert_eq!(config.api_url, "http://localhost:3000/v1");
        assert_eq!(config.chunk_size, 10);
        assert_eq!(config.output_format, "pretty");
        assert!(config.api_token.is_empty());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = CliConfig::load_from(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn load_accepts_string_and_numeric_ports() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"apiUrl":"http://x/v1","apiPort":"4000","uiPort":4001,"temporalPort":""}"#,
        )
        .unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.api_port, Some(4000));
        assert_eq!(config.ui_port, Some(4001));
        assert_eq!(config.temporal_port, None);
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn load_rejects_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(CliConfig::load_from(&path).is_err());
    }

    #[test]
    fn save_preserves_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"apiUrl":"http://old/v1","theme":"dark"}"#).unwrap();

        let mut config = CliConfig::load_from(&path).unwrap();
        config.api_token = "t0ken".to_string();
        config.save_to(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["apiToken"], "t0ken");
        assert!(raw.get("workerRepoUrl").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".reposwarm");
        let path = dir.join("config.json");

        CliConfig::default().save_to(&path).unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn env_overrides_replace_url_and_token() {
        let mut config = CliConfig::default();
        config.apply_env_overrides(|key| match key {
            API_URL_ENV => Ok("https://remote.example/v1".to_string()),
            API_TOKEN_ENV => Ok("from-env".to_string()),
            _ => Err(std::env::VarError::NotPresent),
        });
        assert_eq!(config.api_url, "https://remote.example/v1");
        assert_eq!(config.api_token, "from-env");
    }

    #[test]
    fn empty_env_override_is_ignored() {
        let mut config = CliConfig::default();
        config.apply_env_overrides(|_| Ok(String::new()));
        assert_eq!(config.api_url, "http://localhost:3000/v1");
    }

    #[test]
    fn mask_token_hides_prefix() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("abcdefghijkl"), "********ijkl");
    }
}
