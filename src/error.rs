//! Error types for RepoSwarm operations.
//!
//! This module defines [`SwarmError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `SwarmError` for failures the bootstrap pipeline classifies
//!   (fetch, install, build, launch, health, config write)
//! - Wrap a failure with [`SwarmError::Step`] once the owning pipeline step is known
//! - Use `anyhow::Error` (via `SwarmError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for RepoSwarm operations.
#[derive(Debug, Error)]
pub enum SwarmError {
    /// One or more hard prerequisites are not installed.
    #[error("missing prerequisites: {} (install them first)", .missing.join(", "))]
    PrerequisitesMissing { missing: Vec<String> },

    /// Cloning a service repository failed.
    #[error("{service}: git clone failed: {message}")]
    FetchFailed { service: String, message: String },

    /// Installing a service's dependencies failed.
    #[error("{service}: dependency install failed: {message}")]
    InstallFailed { service: String, message: String },

    /// Building a service failed.
    #[error("{service}: build failed: {message}")]
    BuildFailed { service: String, message: String },

    /// Starting a service failed.
    #[error("{service}: launch failed: {message}")]
    LaunchFailed { service: String, message: String },

    /// A health endpoint never became healthy.
    #[error("timed out after {}s waiting for {url}", .elapsed.as_secs())]
    HealthTimeout { url: String, elapsed: Duration },

    /// Writing a configuration or env file failed.
    #[error("failed to write {path}: {message}")]
    ConfigWriteFailed { path: PathBuf, message: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A pipeline step failed; carries the step name and the cause.
    #[error("{step}: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<SwarmError>,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwarmError {
    /// Wrap this error with the name of the step it failed in.
    pub fn in_step(self, step: &str) -> Self {
        SwarmError::Step {
            step: step.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, unwrapping any step wrappers.
    pub fn root(&self) -> &SwarmError {
        match self {
            SwarmError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for RepoSwarm operations.
pub type Result<T> = std::result::Result<T, SwarmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prerequisites_missing_lists_every_tool() {
        let err = SwarmError::PrerequisitesMissing {
            missing: vec!["docker".into(), "git".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("docker, git"));
        assert!(msg.contains("install them first"));
    }

    #[test]
    fn install_failed_displays_service_and_message() {
        let err = SwarmError::InstallFailed {
            service: "api".into(),
            message: "npm ERR! code E404".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("api"));
        assert!(msg.contains("E404"));
    }

    #[test]
    fn health_timeout_displays_url_and_elapsed() {
        let err = SwarmError::HealthTimeout {
            url: "http://localhost:3000/v1/health".into(),
            elapsed: Duration::from_secs(30),
        };
        let msg = err.to_string();
        assert!(msg.contains("30s"));
        assert!(msg.contains("/v1/health"));
    }

    #[test]
    fn config_write_failed_displays_path() {
        let err = SwarmError::ConfigWriteFailed {
            path: PathBuf::from("/home/me/.reposwarm/config.json"),
            message: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("config.json"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = SwarmError::CommandFailed {
            command: "npm install".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("npm install"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn in_step_prefixes_step_name() {
        let err = SwarmError::LaunchFailed {
            service: "ui".into(),
            message: "no such file".into(),
        }
        .in_step("ui");
        assert!(err.to_string().starts_with("ui: "));
        assert!(matches!(err.root(), SwarmError::LaunchFailed { .. }));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SwarmError = io_err.into();
        assert!(matches!(err, SwarmError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(SwarmError::PrerequisitesMissing {
                missing: vec!["node (v22+)".into()],
            })
        }
        assert!(returns_error().is_err());
    }
}
