//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod read_actions;
mod read_state;
mod verify;

pub use clean::Clean;
pub use read_actions::ReadActions;
pub use read_state::ReadState;
pub use verify::Verify;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use runtime::GameId;

use crate::dirs;

/// Arguments shared by every command that reads one game.
#[derive(Args, Debug)]
pub struct GameArgs {
    /// Game to read (defaults to the most recently modified one)
    #[arg(short, long, value_name = "GAME")]
    game: Option<String>,

    /// Custom data directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

impl GameArgs {
    /// Resolve the data directory and game identifier.
    pub fn resolve(&self) -> Result<(PathBuf, GameId)> {
        let data_dir = self.data_dir.clone().unwrap_or_else(dirs::data_dir);
        if !data_dir.exists() {
            anyhow::bail!("Data directory not found: {}", data_dir.display());
        }

        let game = match &self.game {
            Some(game) => game.clone(),
            None => dirs::find_latest_game(&data_dir)?,
        };
        let game: GameId = game
            .parse()
            .with_context(|| format!("Invalid game id: {game}"))?;

        if !data_dir.join(game.as_str()).exists() {
            anyhow::bail!("Game not found: {} in {}", game, data_dir.display());
        }
        Ok((data_dir, game))
    }
}
