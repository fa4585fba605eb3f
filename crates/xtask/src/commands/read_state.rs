//! Read a stored snapshot or the state replayed from a game's log

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use game_core::{GameState, replay_from};
use runtime::{
    ActionRepository, FileActionRepository, FileSnapshotRepository, SnapshotRepository,
    hash_game_state,
};

use super::GameArgs;

/// Read and inspect game states
#[derive(Parser)]
pub struct ReadState {
    #[command(flatten)]
    game: GameArgs,

    /// Read the stored snapshot at this sequence instead of replaying the log
    #[arg(short, long, value_name = "SEQUENCE")]
    sequence: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (turn info, entities, board)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadState {
    pub fn execute(self) -> Result<()> {
        let (data_dir, game) = self.game.resolve()?;
        let snapshots = FileSnapshotRepository::new(&data_dir)?;

        let (source, state) = match self.sequence {
            Some(sequence) => {
                let snapshot = snapshots.load(&game, sequence)?.with_context(|| {
                    let available = snapshots.list_sequences(&game).unwrap_or_default();
                    format!("No snapshot at sequence {sequence} (available: {available:?})")
                })?;
                (format!("snapshot {sequence}"), snapshot.state)
            }
            None => {
                let entries = FileActionRepository::new(&data_dir)?.load(&game, 0)?;
                let start = snapshots
                    .latest_at_or_before(&game, entries.len() as u64)?
                    .with_context(|| format!("Game {game} has no initial state"))?;
                let tail = entries.get(start.sequence as usize..).unwrap_or_default();
                let state = replay_from(&start, tail)
                    .with_context(|| format!("Failed to replay {game}"))?;
                (
                    format!("replayed from snapshot {}", start.sequence),
                    state,
                )
            }
        };

        println!("{} {}", style("Game:").bold().cyan(), game);
        println!("{} {}", style("Source:").bold().cyan(), source);
        println!(
            "{} {}",
            style("State Hash:").bold().cyan(),
            hash_game_state(&state).context("Failed to hash state")?
        );
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&state),
            OutputFormat::Json => print_json(&state)?,
            OutputFormat::Debug => print_debug(&state),
        }

        Ok(())
    }
}

fn print_summary(state: &GameState) {
    println!("{}", style("=== Game State Summary ===").bold().green());
    println!();

    println!("{}", style("Turn Information:").bold().yellow());
    println!("  Status: {}", state.status());
    println!("  Applied Actions: {}", state.applied);
    println!("  Turn: {}  Round: {}", state.turn.turn, state.turn.round);
    println!("  Consecutive Passes: {}", state.turn.consecutive_passes);
    let acting: Vec<String> = state.acting_names().iter().map(|n| n.to_string()).collect();
    println!("  Acting: {}", acting.join(", "));
    println!();

    println!("{}", style("Entities:").bold().yellow());
    for entity in state.entities.iter() {
        println!(
            "  {} (ID: {}) - tokens {} in hand, {} placed{}",
            entity.name,
            entity.id,
            entity.tokens_available,
            entity.tokens_placed,
            if entity.resigned { ", resigned" } else { "" }
        );
    }
    println!();

    println!("{}", style("Board:").bold().yellow());
    for location in state.board.locations() {
        let slots: Vec<String> = location
            .slots
            .iter()
            .map(|slot| match slot.and_then(|id| state.entities.get(id)) {
                Some(entity) => entity.name.to_string(),
                None => "-".to_string(),
            })
            .collect();
        println!(
            "  {} (revenue {}): [{}]",
            location.id,
            location.revenue,
            slots.join(", ")
        );
    }
    println!();

    if let Some(result) = &state.result {
        println!("{}", style("Result:").bold().yellow());
        for (name, score) in &result.scores {
            println!("  {}: {}", name, score);
        }
        let winners: Vec<String> = result.winners().iter().map(|n| n.to_string()).collect();
        println!("  Winners: {}", winners.join(", "));
        println!();
    }
}

fn print_json(state: &GameState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("Failed to serialize state to JSON")?;
    println!("{}", json);
    Ok(())
}

fn print_debug(state: &GameState) {
    println!("{:#?}", state);
}
