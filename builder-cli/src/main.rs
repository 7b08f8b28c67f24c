//! Builder: origin management from the terminal.
//!
//! # Usage
//!
//! ```text
//! builder sign-in --username <name> --token <token>
//! builder sign-out
//! builder origin check <name>
//! builder origin create <name>
//! builder origin list [--json]
//! builder copy <text>
//! builder config show
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    config::ConfigCommand, copy::CopyArgs, origin::OriginCommand, session::SignInArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "builder",
    version,
    about = "Create and inspect Builder origins",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store credentials for subsequent commands.
    SignIn(SignInArgs),

    /// Forget the stored credentials.
    SignOut,

    /// Check, create and list origins.
    Origin {
        #[command(subcommand)]
        command: OriginCommand,
    },

    /// Copy text to the system clipboard.
    Copy(CopyArgs),

    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn home() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// Single-threaded runtime for one command's worth of async work.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    builder_web::init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::SignIn(args) => args.run(),
        Commands::SignOut => commands::session::sign_out(),
        Commands::Origin { command } => commands::origin::run(command),
        Commands::Copy(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
    }
}
