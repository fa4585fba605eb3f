//! Read and inspect a game's action log
//!
//! Loads `actions.log` through the file repository and displays its entries.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::collections::HashMap;

use game_core::{ActionKind, LoggedAction};
use runtime::{ActionRepository, FileActionRepository};

use super::GameArgs;

/// Read and inspect action log files
#[derive(Parser)]
pub struct ReadActions {
    #[command(flatten)]
    game: GameArgs,

    /// Only show entries from this sequence on
    #[arg(long, default_value = "0")]
    from: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Limit number of actions to display (0 = unlimited)
    #[arg(short, long, default_value = "100")]
    limit: usize,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (action kinds and counts)
    Summary,
    /// One line per action
    List,
    /// Full JSON output
    Json,
}

impl ReadActions {
    pub fn execute(self) -> Result<()> {
        let (data_dir, game) = self.game.resolve()?;

        let repository = FileActionRepository::new(&data_dir)?;
        let entries = repository
            .load(&game, self.from)
            .with_context(|| format!("Failed to load action log of {game}"))?;

        println!("{} {}", style("Game:").bold().cyan(), game);
        println!(
            "{} {}",
            style("Data Directory:").bold().cyan(),
            data_dir.display()
        );
        println!(
            "{} {}",
            style("Total Actions:").bold().cyan(),
            entries.len()
        );
        println!();

        let limit = if self.limit == 0 {
            usize::MAX
        } else {
            self.limit
        };
        let shown = &entries[..entries.len().min(limit)];

        match self.format {
            OutputFormat::Summary => print_summary(&entries),
            OutputFormat::List => print_list(shown),
            OutputFormat::Json => print_json(shown)?,
        }

        Ok(())
    }
}

fn kind_counts(entries: &[LoggedAction]) -> HashMap<ActionKind, usize> {
    entries
        .iter()
        .fold(HashMap::new(), |mut counts, entry| {
            *counts.entry(entry.action.kind()).or_default() += 1;
            counts
        })
}

fn print_summary(entries: &[LoggedAction]) {
    println!("{}", style("=== Action Summary ===").bold().green());
    println!();

    // Sort by count (descending)
    let mut counts: Vec<_> = kind_counts(entries).into_iter().collect();
    counts.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.as_snake_case().cmp(b.0.as_snake_case()))
    });

    println!("{}", style("Action Kind Distribution:").bold().yellow());
    for (kind, count) in counts {
        println!("  {}: {}", kind, count);
    }
    println!();

    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        println!("{}", style("Sequence Range:").bold().yellow());
        println!("  First: {}", first.sequence);
        println!("  Last: {}", last.sequence);
        println!();
    }
}

fn print_list(entries: &[LoggedAction]) {
    println!("{}", style("=== Action List ===").bold().green());
    println!();

    for entry in entries {
        println!(
            "{} {:>5}: {} by {} {:?}",
            style("#").bold(),
            entry.sequence,
            style(entry.action.kind()).yellow(),
            entry.action.entity(),
            entry.action
        );
    }
}

fn print_json(entries: &[LoggedAction]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(entries).context("Failed to serialize actions to JSON")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Action;

    #[test]
    fn counts_group_by_kind() {
        let entries = vec![
            LoggedAction::new(0, Action::place_token("PRR", "E5", 0)),
            LoggedAction::new(1, Action::pass("NYC")),
            LoggedAction::new(2, Action::pass("PRR")),
        ];

        let counts = kind_counts(&entries);
        assert_eq!(counts.get(&ActionKind::Pass), Some(&2));
        assert_eq!(counts.get(&ActionKind::PlaceToken), Some(&1));
        assert_eq!(counts.get(&ActionKind::Resign), None);
    }
}
