//! Local environment bootstrap.
//!
//! Provisions the whole RepoSwarm stack on this machine:
//!
//! | Step | On failure |
//! |---|---|
//! | `prerequisites` | abort, before touching the filesystem |
//! | `directories` | abort |
//! | `temporal` | abort |
//! | `api` | abort |
//! | `worker` | warn and continue |
//! | `ui` | warn and continue |
//! | `cli-config` | abort |
//! | `verify` | recorded; fails only when Temporal or the API is down |
//!
//! Runs are not guarded against each other: two concurrent runs against
//! the same install directory race on every file.

pub mod orchestrator;
pub mod result;
pub mod step;

pub use orchestrator::{generate_token, Orchestrator, SetupOptions, SetupProgress, TOKEN_BYTES};
pub use result::{SetupAborted, SetupResult};
pub use step::{SetupStep, StepResult, StepStatus};
