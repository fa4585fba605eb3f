//! Development tasks for the tokenline workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadActions, ReadState, Verify};

/// Development tasks for the tokenline workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Inspect and audit persisted games", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Read and inspect a game's action log
    ReadActions(ReadActions),

    /// Read a stored snapshot or the replayed current state
    ReadState(ReadState),

    /// Replay a game's log and check it against every stored snapshot
    Verify(Verify),

    /// Delete save data
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for SAVE_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::ReadActions(cmd) => cmd.execute(),
        Command::ReadState(cmd) => cmd.execute(),
        Command::Verify(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
