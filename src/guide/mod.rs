//! Installation guides for setting RepoSwarm up by hand or by agent.
//!
//! Guide mode writes two Markdown files into the install directory:
//!
//! | File                   | Reader                                  |
//! |------------------------|-----------------------------------------|
//! | `INSTALL.md`           | a person, section by section            |
//! | `REPOSWARM_INSTALL.md` | a coding agent, numbered steps + checks |
//!
//! Both render the same [`ServicePlan`](crate::provision::ServicePlan)s
//! and compose file the local bootstrap uses, so they never drift from it.

mod agent;
mod install;
mod markdown;

pub use agent::generate_agent_guide;
pub use install::{generate_guide, install_instructions, venv_activate, Instructions};

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{write_with_mode, ServiceConfig};
use crate::environment::Environment;
use crate::error::{Result, SwarmError};

/// Human-oriented guide file name.
pub const GUIDE_FILE: &str = "INSTALL.md";

/// Agent-oriented guide file name.
pub const AGENT_GUIDE_FILE: &str = "REPOSWARM_INSTALL.md";

/// Stands in for the bearer token in guide commands.
pub const TOKEN_PLACEHOLDER: &str = "your-secret-token-here";

/// Where [`write_guides`] put the files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidePaths {
    pub guide: PathBuf,
    pub agent_guide: PathBuf,
}

/// Render both guides and write them into `install_dir`, creating it.
pub fn write_guides(
    env: &Environment,
    config: &ServiceConfig,
    install_dir: &Path,
) -> Result<GuidePaths> {
    fs::create_dir_all(install_dir).map_err(|e| SwarmError::ConfigWriteFailed {
        path: install_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let paths = GuidePaths {
        guide: install_dir.join(GUIDE_FILE),
        agent_guide: install_dir.join(AGENT_GUIDE_FILE),
    };

    let guide = generate_guide(env, config, install_dir)?;
    write_with_mode(&paths.guide, guide.as_bytes(), 0o644)?;
    debug!("Wrote {}", paths.guide.display());

    let agent_guide = generate_agent_guide(env, config, install_dir)?;
    write_with_mode(&paths.agent_guide, agent_guide.as_bytes(), 0o644)?;
    debug!("Wrote {}", paths.agent_guide.display());

    Ok(paths)
}
