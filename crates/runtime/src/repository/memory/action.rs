//! In-memory ActionRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use game_core::LoggedAction;

use crate::repository::{ActionRepository, GameId, RepositoryError, Result};

/// Action logs held in a process-local map.
#[derive(Default)]
pub struct InMemoryActionRepository {
    logs: RwLock<HashMap<GameId, Vec<LoggedAction>>>,
}

impl InMemoryActionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActionRepository for InMemoryActionRepository {
    fn append(&self, game: &GameId, entry: &LoggedAction) -> Result<()> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let log = logs.entry(game.clone()).or_default();

        let expected = log.len() as u64;
        if entry.sequence != expected {
            return Err(RepositoryError::OutOfOrder {
                game: game.clone(),
                expected,
                found: entry.sequence,
            });
        }
        log.push(entry.clone());
        Ok(())
    }

    fn load(&self, game: &GameId, from: u64) -> Result<Vec<LoggedAction>> {
        let logs = self
            .logs
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(logs
            .get(game)
            .map(|log| log.iter().skip(from as usize).cloned().collect())
            .unwrap_or_default())
    }

    fn len(&self, game: &GameId) -> Result<u64> {
        let logs = self
            .logs
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(logs.get(game).map_or(0, |log| log.len() as u64))
    }

    fn truncate(&self, game: &GameId, len: u64) -> Result<()> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if let Some(log) = logs.get_mut(game) {
            log.truncate(len as usize);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use game_core::Action;

    use super::*;

    #[test]
    fn rejects_out_of_order_appends() {
        let repo = InMemoryActionRepository::new();
        let game = GameId::new("g1").unwrap();

        repo.append(&game, &LoggedAction::new(0, Action::pass("PRR")))
            .unwrap();
        let error = repo
            .append(&game, &LoggedAction::new(2, Action::pass("NYC")))
            .unwrap_err();
        assert!(matches!(
            error,
            RepositoryError::OutOfOrder {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert_eq!(repo.len(&game).unwrap(), 1);
    }

    #[test]
    fn truncate_and_load_tail() {
        let repo = InMemoryActionRepository::new();
        let game = GameId::new("g1").unwrap();
        for (sequence, name) in [(0, "PRR"), (1, "NYC"), (2, "Erie")] {
            repo.append(&game, &LoggedAction::new(sequence, Action::pass(name)))
                .unwrap();
        }

        let tail = repo.load(&game, 1).unwrap();
        assert_eq!(tail.iter().map(|e| e.sequence).collect::<Vec<_>>(), [1, 2]);

        repo.truncate(&game, 1).unwrap();
        assert_eq!(repo.len(&game).unwrap(), 1);
        repo.append(&game, &LoggedAction::new(1, Action::resign("NYC")))
            .unwrap();
        assert_eq!(repo.len(&game).unwrap(), 2);
    }
}
