//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::bootstrap::SetupStep;

/// RepoSwarm - local environment bootstrap.
#[derive(Debug, Parser)]
#[command(name = "reposwarm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the subcommand writes JSON to stdout.
    pub fn json(&self) -> bool {
        match &self.command {
            Commands::New(args) => args.json,
            Commands::Doctor(args) => args.json,
            Commands::Stop(_) => false,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Set up a new local RepoSwarm installation
    #[command(long_about = "Detects your local environment, generates a tailored installation guide,\n\
and optionally hands it to a coding agent for interactive setup.\n\n\
Use --local to set up and start every service automatically\n\
(Temporal, API, Worker, UI).")]
    New(NewArgs),

    /// Show the detected environment and missing prerequisites
    Doctor(DoctorArgs),

    /// Stop services started by `reposwarm new --local`
    Stop(StopArgs),
}

/// Arguments for the `new` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct NewArgs {
    /// Installation directory (default: ./reposwarm)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Automated local setup: start Temporal, API, Worker and UI
    #[arg(long)]
    pub local: bool,

    /// Only generate the guide files, don't prompt
    #[arg(long, conflicts_with = "local")]
    pub guide_only: bool,

    /// Launch the detected coding agent without asking
    #[arg(long, conflicts_with = "local")]
    pub agent: bool,

    /// Steps to leave out of --local (comma-separated: worker, ui, verify)
    #[arg(long, value_delimiter = ',', value_parser = parse_skippable)]
    pub skip: Vec<SetupStep>,

    /// Skip the final verification pass
    #[arg(long)]
    pub no_verify: bool,

    /// Print a JSON report instead of progress output
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `doctor` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DoctorArgs {
    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `stop` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StopArgs {
    /// Installation directory (default: ./reposwarm)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

fn parse_skippable(s: &str) -> Result<SetupStep, String> {
    let step: SetupStep = s.parse()?;
    if step.is_skippable() {
        Ok(step)
    } else {
        Err(format!("{} cannot be skipped (skippable: worker, ui, verify)", step))
    }
}
