//! Configuration for the local stack and the CLI.
//!
//! - [`defaults`] - the built-in repository URLs, ports and identifiers
//! - [`ServiceConfig`] - resolved, immutable settings for one bootstrap run
//! - [`CliConfig`] - the persisted `~/.reposwarm/config.json`
//! - [`EnvFile`] / [`EnvFileParser`] - per-service `.env` files
//!
//! # Example
//!
//! ```
//! use reposwarm::config::{CliConfig, ServiceConfig};
//!
//! let cli = CliConfig { api_port: Some(4000), ..Default::default() };
//! let services = ServiceConfig::from_cli_config(&cli);
//! assert_eq!(services.api_base_url(), "http://localhost:4000/v1");
//! ```

pub mod cli_config;
pub mod defaults;
pub mod env_file;
pub mod service;

pub use cli_config::{mask_token, CliConfig};
pub use env_file::{write_with_mode, EnvFile, EnvFileParser};
pub use service::ServiceConfig;
