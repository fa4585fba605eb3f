//! Repository contracts for persisting action logs and snapshots.

use game_core::{LoggedAction, Snapshot};

use super::{GameId, Result};

/// Repository for per-game action logs.
///
/// Entries are keyed by `(GameId, sequence)`. Implementations must keep each
/// game's entries contiguous from sequence 0 and reject any append whose
/// sequence is not exactly `len`.
pub trait ActionRepository: Send + Sync {
    /// Append the next entry of `game`'s log.
    fn append(&self, game: &GameId, entry: &LoggedAction) -> Result<()>;

    /// Load every entry with `sequence >= from`, ordered by sequence.
    fn load(&self, game: &GameId, from: u64) -> Result<Vec<LoggedAction>>;

    /// Number of persisted entries (the sequence of the next one).
    fn len(&self, game: &GameId) -> Result<u64>;

    /// Discard every entry with `sequence >= len`.
    fn truncate(&self, game: &GameId, len: u64) -> Result<()>;
}

/// Repository for per-game state snapshots.
///
/// The snapshot at sequence 0 holds the initial state and is what makes a
/// game exist from the repository's point of view.
pub trait SnapshotRepository: Send + Sync {
    /// Save (or overwrite) the snapshot at `snapshot.sequence`.
    fn save(&self, game: &GameId, snapshot: &Snapshot) -> Result<()>;

    /// Load the snapshot taken at exactly `sequence`.
    fn load(&self, game: &GameId, sequence: u64) -> Result<Option<Snapshot>>;

    /// Load the snapshot with the greatest sequence `<= sequence`.
    fn latest_at_or_before(&self, game: &GameId, sequence: u64) -> Result<Option<Snapshot>> {
        let candidate = self
            .list_sequences(game)?
            .into_iter()
            .rev()
            .find(|stored| *stored <= sequence);
        match candidate {
            Some(stored) => self.load(game, stored),
            None => Ok(None),
        }
    }

    /// Delete every snapshot with a sequence greater than `sequence`.
    ///
    /// Returns the number of snapshots deleted.
    fn delete_after(&self, game: &GameId, sequence: u64) -> Result<usize>;

    /// List stored snapshot sequences in ascending order.
    fn list_sequences(&self, game: &GameId) -> Result<Vec<u64>>;

    /// Returns true if `game` has an initial state.
    fn exists(&self, game: &GameId) -> Result<bool> {
        Ok(self.list_sequences(game)?.first() == Some(&0))
    }
}
