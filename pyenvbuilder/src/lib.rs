//! pyenvbuilder CLI library: argument parsing, command dispatch, exit codes.

mod cli;
mod commands;
pub mod exit;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

/// Parse args, initialize logging and dispatch to the command handler.
///
/// Usage errors, `--help` and `--version` are handled by clap (exit 2 or 0).
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    pyenvbuilder_core::observability::init_tracing();

    match cli.command {
        Commands::Create {
            path,
            name,
            force,
            packages,
            requirements,
        } => {
            let ctx = commands::Context::load(&cli.global)?;
            commands::create::cmd_create(&ctx, &path, name, force, packages, requirements)?;
        }
        Commands::Cleanup { path, force } => {
            commands::cleanup::cmd_cleanup(&path, force)?;
        }
        Commands::Xcode {
            project_dir,
            name,
            force,
        } => {
            let ctx = commands::Context::load(&cli.global)?;
            commands::xcode::cmd_xcode(&ctx, &project_dir, name, force)?;
        }
    }
    Ok(())
}
