//! File-based ActionRepository implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use game_core::LoggedAction;

use super::{ACTIONS_FILE, FileLog, game_dir};
use crate::repository::{ActionRepository, GameId, RepositoryError, Result};

type SharedLog = Arc<Mutex<FileLog<LoggedAction>>>;

/// One append-only `actions.log` per game.
///
/// Log files are opened lazily and kept open. The outer map lock is only
/// held to look a log up; each game's file has its own lock, so disk writes
/// of different games never wait on each other.
pub struct FileActionRepository {
    base_dir: PathBuf,
    logs: Mutex<HashMap<GameId, SharedLog>>,
}

impl FileActionRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            logs: Mutex::new(HashMap::new()),
        })
    }

    fn log_path(&self, game: &GameId) -> PathBuf {
        game_dir(&self.base_dir, game).join(ACTIONS_FILE)
    }

    /// Looks up the game's log, opening it on first use. Missing logs are
    /// only created when `create` is set.
    fn shared_log(&self, game: &GameId, create: bool) -> Result<Option<SharedLog>> {
        let mut logs = self.logs.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        if let Some(log) = logs.get(game) {
            return Ok(Some(Arc::clone(log)));
        }

        let path = self.log_path(game);
        if !create && !path.exists() {
            return Ok(None);
        }
        let log = Arc::new(Mutex::new(open_verified(&path)?));
        logs.insert(game.clone(), Arc::clone(&log));
        Ok(Some(log))
    }

    /// Runs `f` against the game's log while holding only that log's lock.
    /// Returns `None` without calling `f` if the log does not exist.
    fn with_log<R>(
        &self,
        game: &GameId,
        create: bool,
        f: impl FnOnce(&mut FileLog<LoggedAction>) -> Result<R>,
    ) -> Result<Option<R>> {
        let Some(log) = self.shared_log(game, create)? else {
            return Ok(None);
        };
        let mut log = log.lock().map_err(|_| RepositoryError::LockPoisoned)?;
        f(&mut log).map(Some)
    }
}

/// Opens a log and checks that it holds sequences `0..n`.
fn open_verified(path: &Path) -> Result<FileLog<LoggedAction>> {
    let mut log: FileLog<LoggedAction> = FileLog::open_or_create(path)?;
    for (index, entry) in log.read_from(0)?.iter().enumerate() {
        let expected = index as u64;
        if entry.sequence != expected {
            return Err(RepositoryError::CorruptedData(format!(
                "{}: entry {} carries sequence {}",
                path.display(),
                expected,
                entry.sequence
            )));
        }
    }
    Ok(log)
}

impl ActionRepository for FileActionRepository {
    fn append(&self, game: &GameId, entry: &LoggedAction) -> Result<()> {
        self.with_log(game, true, |log| {
            let expected = log.len();
            if entry.sequence != expected {
                return Err(RepositoryError::OutOfOrder {
                    game: game.clone(),
                    expected,
                    found: entry.sequence,
                });
            }
            log.append(entry)?;
            Ok(())
        })?;
        Ok(())
    }

    fn load(&self, game: &GameId, from: u64) -> Result<Vec<LoggedAction>> {
        Ok(self
            .with_log(game, false, |log| log.read_from(from))?
            .unwrap_or_default())
    }

    fn len(&self, game: &GameId) -> Result<u64> {
        Ok(self
            .with_log(game, false, |log| Ok(log.len()))?
            .unwrap_or(0))
    }

    fn truncate(&self, game: &GameId, len: u64) -> Result<()> {
        self.with_log(game, false, |log| log.truncate(len))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use game_core::Action;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let game = GameId::new("erie-run").unwrap();

        let repo = FileActionRepository::new(temp_dir.path()).unwrap();
        assert_eq!(repo.len(&game).unwrap(), 0);
        repo.append(&game, &LoggedAction::new(0, Action::place_token("PRR", "E5", 0)))
            .unwrap();
        repo.append(&game, &LoggedAction::new(1, Action::pass("NYC")))
            .unwrap();
        drop(repo);

        let repo = FileActionRepository::new(temp_dir.path()).unwrap();
        let entries = repo.load(&game, 0).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].action, Action::pass("NYC"));

        repo.truncate(&game, 1).unwrap();
        assert_eq!(repo.len(&game).unwrap(), 1);
        assert!(matches!(
            repo.append(&game, &LoggedAction::new(5, Action::pass("NYC"))),
            Err(RepositoryError::OutOfOrder { expected: 1, .. })
        ));
    }

    #[test]
    fn games_do_not_share_a_file_lock() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileActionRepository::new(temp_dir.path()).unwrap();
        let busy = GameId::new("busy").unwrap();
        let other = GameId::new("other").unwrap();

        let log = repo.shared_log(&busy, true).unwrap().unwrap();
        let _held = log.lock().unwrap();

        repo.append(&other, &LoggedAction::new(0, Action::pass("PRR")))
            .unwrap();
        assert_eq!(repo.len(&other).unwrap(), 1);
    }

    #[test]
    fn unknown_games_read_as_empty_without_creating_files() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileActionRepository::new(temp_dir.path()).unwrap();
        let game = GameId::new("ghost").unwrap();

        assert!(repo.load(&game, 0).unwrap().is_empty());
        repo.truncate(&game, 0).unwrap();
        assert!(!temp_dir.path().join("ghost").exists());
    }
}
