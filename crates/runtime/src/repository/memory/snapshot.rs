//! In-memory SnapshotRepository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use game_core::Snapshot;

use crate::repository::{GameId, RepositoryError, Result, SnapshotRepository};

/// Snapshots held in a process-local map, ordered by sequence per game.
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<HashMap<GameId, BTreeMap<u64, Snapshot>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, game: &GameId, snapshot: &Snapshot) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots
            .entry(game.clone())
            .or_default()
            .insert(snapshot.sequence, snapshot.clone());
        Ok(())
    }

    fn load(&self, game: &GameId, sequence: u64) -> Result<Option<Snapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots
            .get(game)
            .and_then(|stored| stored.get(&sequence))
            .cloned())
    }

    fn latest_at_or_before(&self, game: &GameId, sequence: u64) -> Result<Option<Snapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots
            .get(game)
            .and_then(|stored| stored.range(..=sequence).next_back())
            .map(|(_, snapshot)| snapshot.clone()))
    }

    fn delete_after(&self, game: &GameId, sequence: u64) -> Result<usize> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let Some(stored) = snapshots.get_mut(game) else {
            return Ok(0);
        };
        let removed = stored.split_off(&sequence.saturating_add(1));
        Ok(removed.len())
    }

    fn list_sequences(&self, game: &GameId) -> Result<Vec<u64>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots
            .get(game)
            .map(|stored| stored.keys().copied().collect())
            .unwrap_or_default())
    }
}
