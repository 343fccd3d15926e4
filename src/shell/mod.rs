//! Command execution and shell environment helpers.

pub mod command;
pub mod mock;
pub mod platform;

pub use command::{
    capture_with_timeout, command_exists, is_executable, parse_system_path, resolve_tool_path,
    CommandOutput, CommandRunner, CommandSpec, SystemRunner,
};
pub use mock::MockRunner;
pub use platform::{is_ci, ShellType};
