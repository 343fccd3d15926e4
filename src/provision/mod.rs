//! Service provisioning.
//!
//! Each source-built service (API, worker, UI) goes through the same
//! sequence, driven by a [`ServicePlan`]:
//!
//! 1. clone the repository, unless its directory already exists
//! 2. install dependencies, then build where the service needs it
//! 3. write the service's env file
//! 4. launch it detached, logging to `<service>.log` with the pid in
//!    `<service>.pid`
//! 5. wait for its health endpoint
//!
//! The workflow coordinator (Temporal) runs from a Compose manifest
//! instead; see [`compose`].
//!
//! Only the clone is skipped on a re-run. Install, env-file write and
//! launch always run again, so provisioning over a running stack starts
//! duplicate processes.

pub mod compose;
pub mod process;
pub mod provisioner;
pub mod service;

pub use compose::{ComposeFile, COMPOSE_FILE_NAME};
pub use process::ProcessHandle;
pub use provisioner::{Provisioner, TEMPORAL_READY_TIMEOUT};
pub use service::{HealthWait, ServiceKind, ServicePlan, Stage};
