//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which builds the real
//! environment, command runner and health probe and hands them to the
//! command. Tests construct commands directly with the mock doubles.

pub mod dispatcher;
pub mod doctor;
pub mod new;
pub mod stop;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use doctor::DoctorCommand;
pub use new::NewCommand;
pub use stop::StopCommand;
