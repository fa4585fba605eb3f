//! Replay audit of a persisted game
//!
//! Replays the whole action log from the initial state and compares the
//! state at every stored snapshot with the replayed one. Any rejected entry,
//! sequence gap or snapshot mismatch means the save data was tampered with
//! or corrupted.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::Path;

use game_core::{GameStatus, Replayer};
use runtime::{
    ActionRepository, FileActionRepository, FileSnapshotRepository, GameId, SnapshotRepository,
    hash_game_state,
};

use super::GameArgs;

/// Verify a game's log against its snapshots
#[derive(Parser)]
pub struct Verify {
    #[command(flatten)]
    game: GameArgs,
}

impl Verify {
    pub fn execute(self) -> Result<()> {
        let (data_dir, game) = self.game.resolve()?;

        match audit(&data_dir, &game) {
            Ok(report) => {
                println!(
                    "{} {} ({} actions, {} snapshots checked, {})",
                    style("✓").green().bold(),
                    style(&game).cyan(),
                    report.actions,
                    report.snapshots_checked,
                    report.status
                );
                println!("  {} {}", style("State Hash:").bold(), report.state_hash);
                Ok(())
            }
            Err(error) => {
                eprintln!(
                    "{} {} failed verification",
                    style("✗").red().bold(),
                    style(&game).cyan()
                );
                Err(error)
            }
        }
    }
}

/// Outcome of a successful audit.
#[derive(Debug)]
pub struct AuditReport {
    pub actions: u64,
    pub snapshots_checked: usize,
    pub status: GameStatus,
    pub state_hash: String,
}

/// Replays `game` under `data_dir` and checks every stored snapshot.
pub fn audit(data_dir: &Path, game: &GameId) -> Result<AuditReport> {
    let actions = FileActionRepository::new(data_dir)?;
    let snapshots = FileSnapshotRepository::new(data_dir)?;

    let initial = snapshots
        .load(game, 0)?
        .with_context(|| format!("Game {game} has no initial state"))?;
    let entries = actions
        .load(game, 0)
        .with_context(|| format!("Failed to load action log of {game}"))?;
    let len = entries.len() as u64;

    let mut stored = snapshots.list_sequences(game)?;
    stored.retain(|sequence| *sequence > 0);
    if let Some(last) = stored.last()
        && *last > len
    {
        anyhow::bail!("Snapshot {last} is past the end of the log ({len} entries)");
    }

    let mut replayer = Replayer::from_snapshot(&initial)?;
    let mut pending = stored.iter().peekable();
    let mut checked = 0;

    for entry in &entries {
        replayer
            .step(entry)
            .with_context(|| format!("Replay of {game} stopped at entry {}", entry.sequence))?;

        if pending.next_if_eq(&&replayer.position()).is_some() {
            let snapshot = snapshots
                .load(game, replayer.position())?
                .with_context(|| format!("Snapshot {} disappeared", replayer.position()))?;
            if snapshot.state != *replayer.state() {
                anyhow::bail!(
                    "Snapshot {} differs from replay: stored {}, replayed {}",
                    snapshot.sequence,
                    hash_game_state(&snapshot.state)?,
                    hash_game_state(replayer.state())?
                );
            }
            checked += 1;
        }
    }

    let state = replayer.into_state();
    Ok(AuditReport {
        actions: len,
        snapshots_checked: checked,
        status: state.status(),
        state_hash: hash_game_state(&state)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Action, GameSetup, GameState, LoggedAction, Snapshot, replay};

    fn actions() -> Vec<Action> {
        vec![
            Action::place_token("PRR", "E5", 0),
            Action::place_token("NYC", "E5", 1),
            Action::pass("PRR"),
        ]
    }

    /// Persists a three-action game with a snapshot after the second action.
    fn persist(dir: &Path, game: &GameId) -> (Vec<LoggedAction>, GameState) {
        let setup = GameSetup::new()
            .with_entity("PRR", 2)
            .with_entity("NYC", 2)
            .with_location("E5", 2, 20);
        let initial = GameState::from_setup(&setup).unwrap();
        let entries: Vec<LoggedAction> = actions()
            .into_iter()
            .enumerate()
            .map(|(index, action)| LoggedAction::new(index as u64, action))
            .collect();

        let action_repo = FileActionRepository::new(dir).unwrap();
        let snapshot_repo = FileSnapshotRepository::new(dir).unwrap();
        snapshot_repo
            .save(game, &Snapshot::initial(initial.clone()))
            .unwrap();
        for entry in &entries {
            action_repo.append(game, entry).unwrap();
        }
        let second = replay(&initial, &entries[..2]).unwrap();
        snapshot_repo.save(game, &Snapshot::new(second)).unwrap();

        (entries, initial)
    }

    #[test]
    fn intact_games_pass() {
        let dir = tempfile::tempdir().unwrap();
        let game = GameId::new("intact").unwrap();
        let (entries, initial) = persist(dir.path(), &game);

        let report = audit(dir.path(), &game).unwrap();
        assert_eq!(report.actions, 3);
        assert_eq!(report.snapshots_checked, 1);
        assert_eq!(report.status, GameStatus::Active);
        assert_eq!(
            report.state_hash,
            hash_game_state(&replay(&initial, &entries).unwrap()).unwrap()
        );
    }

    #[test]
    fn tampered_logs_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        let game = GameId::new("tampered").unwrap();
        persist(dir.path(), &game);

        // NYC cannot act twice in a row, nor take an occupied slot.
        let repository = FileActionRepository::new(dir.path()).unwrap();
        repository.truncate(&game, 2).unwrap();
        repository
            .append(
                &game,
                &LoggedAction::new(2, Action::place_token("NYC", "E5", 0)),
            )
            .unwrap();

        let error = audit(dir.path(), &game).unwrap_err();
        assert!(error.to_string().contains("entry 2"));
    }

    #[test]
    fn tampered_snapshots_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        let game = GameId::new("forged").unwrap();
        let (_, initial) = persist(dir.path(), &game);

        let mut forged = initial;
        forged.applied = 2;
        FileSnapshotRepository::new(dir.path())
            .unwrap()
            .save(&game, &Snapshot::new(forged))
            .unwrap();

        let error = audit(dir.path(), &game).unwrap_err();
        assert!(error.to_string().contains("Snapshot 2 differs"));
    }
}
