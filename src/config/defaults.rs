//! Built-in defaults for the local stack.
//!
//! These are the only place repository URLs, table names, ports and the
//! model id are spelled out. Everything else reads them through
//! [`ServiceConfig`](super::ServiceConfig).

/// Worker repository.
pub const WORKER_REPO_URL: &str = "https://github.com/royosherove/repo-swarm.git";

/// API server repository.
pub const API_REPO_URL: &str = "https://github.com/loki-bedlam/reposwarm-api.git";

/// Web UI repository.
pub const UI_REPO_URL: &str = "https://github.com/loki-bedlam/reposwarm-ui.git";

/// Storage table for repo metadata and investigation results.
pub const DYNAMODB_TABLE: &str = "reposwarm-cache";

/// Model used for investigations.
pub const MODEL: &str = "us.anthropic.claude-sonnet-4-6";

/// Cloud region when none is configured.
pub const REGION: &str = "us-east-1";

/// Temporal frontend (RPC) port.
pub const TEMPORAL_PORT: u16 = 7233;

/// Temporal web UI port.
pub const TEMPORAL_UI_PORT: u16 = 8233;

/// Postgres port exposed by the compose stack.
pub const POSTGRES_PORT: u16 = 5432;

/// API server port.
pub const API_PORT: u16 = 3000;

/// Web UI port.
pub const UI_PORT: u16 = 3001;

/// Temporal namespace used by the API and worker.
pub const TEMPORAL_NAMESPACE: &str = "default";

/// Task queue the worker polls.
pub const TEMPORAL_TASK_QUEUE: &str = "investigate-task-queue";

/// Default investigation chunk size written to the CLI config.
pub const CHUNK_SIZE: u32 = 10;

/// Default CLI output format.
pub const OUTPUT_FORMAT: &str = "pretty";

/// Name of the install directory created under the working directory.
pub const INSTALL_DIR_NAME: &str = "reposwarm";
