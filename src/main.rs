//! RepoSwarm CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use reposwarm::cli::{Cli, CommandDispatcher};
use reposwarm::ui::{OutputMode, Printer, TerminalPrinter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("reposwarm=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reposwarm=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("RepoSwarm starting with args: {:?}", cli);

    // Handle --no-color
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut printer = TerminalPrinter::new(OutputMode::from_flags(cli.quiet, cli.json()));
    let work_dir = std::env::current_dir().unwrap_or_default();
    let dispatcher = CommandDispatcher::new(work_dir);

    match dispatcher.dispatch(&cli, &mut printer) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            printer.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
