//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use game_core::Snapshot;

use super::{SNAPSHOTS_DIR, game_dir};
use crate::repository::{GameId, RepositoryError, Result, SnapshotRepository};

/// Stores each snapshot as `snapshot_{sequence:010}.bin` in bincode format.
///
/// Writes go to a temp file first and are moved into place with a rename,
/// so a crash never leaves a half-written snapshot behind.
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshots_dir(&self, game: &GameId) -> PathBuf {
        game_dir(&self.base_dir, game).join(SNAPSHOTS_DIR)
    }

    fn snapshot_path(&self, game: &GameId, sequence: u64) -> PathBuf {
        self.snapshots_dir(game)
            .join(format!("snapshot_{:010}.bin", sequence))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, game: &GameId, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(self.snapshots_dir(game))?;
        let path = self.snapshot_path(game, snapshot.sequence);
        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(snapshot)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(
            target: "runtime::repository",
            game = %game,
            sequence = snapshot.sequence,
            "saved snapshot"
        );
        Ok(())
    }

    fn load(&self, game: &GameId, sequence: u64) -> Result<Option<Snapshot>> {
        let path = self.snapshot_path(game, sequence);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let snapshot: Snapshot = bincode::deserialize(&bytes).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
        })?;
        if snapshot.sequence != sequence {
            return Err(RepositoryError::CorruptedData(format!(
                "{} holds sequence {}",
                path.display(),
                snapshot.sequence
            )));
        }
        Ok(Some(snapshot))
    }

    fn delete_after(&self, game: &GameId, sequence: u64) -> Result<usize> {
        let mut deleted = 0;
        for stored in self.list_sequences(game)? {
            if stored > sequence {
                fs::remove_file(self.snapshot_path(game, stored))?;
                deleted += 1;
            }
        }
        if deleted > 0 {
            tracing::debug!(
                target: "runtime::repository",
                game = %game,
                after = sequence,
                deleted,
                "deleted snapshots"
            );
        }
        Ok(deleted)
    }

    fn list_sequences(&self, game: &GameId) -> Result<Vec<u64>> {
        let dir = self.snapshots_dir(game);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut sequences = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(sequence) = filename
                    .strip_prefix("snapshot_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(sequence) = sequence.parse::<u64>()
            {
                sequences.push(sequence);
            }
        }

        sequences.sort_unstable();
        Ok(sequences)
    }
}

#[cfg(test)]
mod tests {
    use game_core::{GameSetup, GameState};
    use tempfile::TempDir;

    use super::*;

    fn snapshot(sequence: u64) -> Snapshot {
        let setup = GameSetup::new()
            .with_entity("PRR", 1)
            .with_location("E5", 1, 10);
        let mut state = GameState::from_setup(&setup).unwrap();
        state.applied = sequence;
        Snapshot::new(state)
    }

    #[test]
    fn save_list_load_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::new(temp_dir.path()).unwrap();
        let game = GameId::new("g1").unwrap();
        assert!(!repo.exists(&game).unwrap());

        for sequence in [0, 5, 10, 15] {
            repo.save(&game, &snapshot(sequence)).unwrap();
        }
        assert!(repo.exists(&game).unwrap());
        assert_eq!(repo.list_sequences(&game).unwrap(), [0, 5, 10, 15]);
        assert_eq!(repo.load(&game, 10).unwrap(), Some(snapshot(10)));
        assert_eq!(
            repo.latest_at_or_before(&game, 12).unwrap().map(|s| s.sequence),
            Some(10)
        );

        assert_eq!(repo.delete_after(&game, 5).unwrap(), 2);
        assert_eq!(repo.list_sequences(&game).unwrap(), [0, 5]);
        assert_eq!(repo.load(&game, 15).unwrap(), None);
    }
}
