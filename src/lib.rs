//! RepoSwarm - local environment bootstrap.
//!
//! Provisions the RepoSwarm stack (Temporal, API server, worker, web UI)
//! on a developer machine, points the CLI at it and verifies it. When the
//! automated path is not wanted, writes installation guides instead and
//! can hand them to a coding agent.
//!
//! # Modules
//!
//! - [`bootstrap`] - The eight-step setup pipeline and its result
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Defaults, resolved service settings, CLI config, env files
//! - [`environment`] - Host detection and coding agents
//! - [`error`] - Error types and result aliases
//! - [`guide`] - Installation guides for people and agents
//! - [`health`] - HTTP readiness probing
//! - [`provision`] - Per-service fetch, install, build, launch
//! - [`shell`] - Command execution
//! - [`ui`] - Terminal output and prompts
//!
//! # Example
//!
//! ```
//! use reposwarm::bootstrap::{Orchestrator, SetupOptions, SetupStep, StepStatus};
//! use reposwarm::config::ServiceConfig;
//! use reposwarm::environment::Environment;
//! use reposwarm::health::MockHealth;
//! use reposwarm::shell::MockRunner;
//! use reposwarm::ui::MockPrinter;
//!
//! // Nothing installed: the run stops at the first step.
//! let env = Environment::default();
//! let (runner, health) = (MockRunner::new(), MockHealth::new());
//! let orchestrator = Orchestrator::new(&env, ServiceConfig::default(), &runner, &health);
//!
//! let options = SetupOptions::new("/tmp/reposwarm-doc", "/tmp/reposwarm-doc.json");
//! let aborted = orchestrator.run(&options, &mut MockPrinter::new()).unwrap_err();
//! assert_eq!(aborted.result.steps.len(), 1);
//! assert_eq!(aborted.result.status_of(SetupStep::Prerequisites), Some(StepStatus::Fail));
//! ```

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod guide;
pub mod health;
pub mod provision;
pub mod shell;
pub mod ui;

pub use error::{Result, SwarmError};
