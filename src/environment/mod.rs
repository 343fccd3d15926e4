//! Host environment probing.
//!
//! Detection is read-only and never fails: anything that cannot be
//! determined is reported as absent. The bootstrap reads the result to
//! decide whether prerequisites are met and which coding agent, if any,
//! the guide can be handed to.

pub mod agent;
pub mod detection;

pub use agent::Agent;
pub use detection::{extract_version, Environment, ToolStatus, VERSION_TIMEOUT};
