//! Clean save data command
//!
//! Deletes either one game's directory or the whole data directory.
//!
//! Safety: Always prompts for confirmation before deletion.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use runtime::GameId;

use crate::dirs;

/// Clean save data
#[derive(Parser, Debug)]
pub struct Clean {
    /// Delete only this game
    #[arg(short, long, value_name = "GAME")]
    pub game: Option<String>,

    /// Custom data directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data_dir.clone().unwrap_or_else(dirs::data_dir);

        let (label, target) = match &self.game {
            Some(game) => {
                let game: GameId = game
                    .parse()
                    .with_context(|| format!("Invalid game id: {game}"))?;
                (format!("Game {game}"), data_dir.join(game.as_str()))
            }
            None => ("All save data".to_string(), data_dir),
        };

        if !target.exists() {
            println!(
                "{}",
                style("Nothing to clean - directory doesn't exist yet").dim()
            );
            return Ok(());
        }

        println!("{}", style("Clean save data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        println!("  {} {}", style("→").cyan(), style(&label).bold());
        println!("    {}", style(target.display()).dim());
        println!();

        if !self.yes && !confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        print!("Deleting {}... ", label);
        io::stdout().flush()?;
        std::fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to delete: {}", target.display()))?;
        println!("{}", style("✓").green());

        Ok(())
    }
}

/// Prompt user for confirmation
fn confirm() -> Result<bool> {
    print!("{} ", style("Proceed? [y/N]").yellow().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
