//! Deterministic re-derivation of state from an action log.
//!
//! Replay rehydrates each stored action against the state it is about to run
//! on and pushes it through the normal [`GameEngine`] checks. Nothing is
//! skipped: an entry that no longer rehydrates or validates aborts the replay
//! with a [`ReplayError`], which always means the log (or the snapshot it was
//! started from) is corrupt.

use crate::action::{ActionKind, RehydrateError};
use crate::error::{ErrorSeverity, GameError};
use crate::log::LoggedAction;
use crate::state::GameState;

use super::{ExecuteError, GameEngine};

/// Full state at a log position.
///
/// `state.applied == sequence` for every well-formed snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub sequence: u64,
    pub state: GameState,
}

impl Snapshot {
    /// Snapshot at position 0.
    pub fn initial(state: GameState) -> Self {
        Self { sequence: 0, state }
    }

    /// Snapshot of `state` at the position it was derived to.
    pub fn new(state: GameState) -> Self {
        Self {
            sequence: state.applied,
            state,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("snapshot claims sequence {sequence} but its state has {applied} actions applied")]
    SnapshotMismatch { sequence: u64, applied: u64 },

    #[error("expected log entry {expected}, found {found}")]
    SequenceMismatch { expected: u64, found: u64 },

    #[error("log entry {sequence} cannot be bound: {source}")]
    Rehydrate {
        sequence: u64,
        #[source]
        source: RehydrateError,
    },

    #[error("log entry {sequence} ({kind}) was rejected on replay: {source}")]
    Rejected {
        sequence: u64,
        kind: ActionKind,
        #[source]
        source: ExecuteError,
    },
}

impl GameError for ReplayError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SnapshotMismatch { .. } => "REPLAY_SNAPSHOT_MISMATCH",
            Self::SequenceMismatch { .. } => "REPLAY_SEQUENCE_MISMATCH",
            Self::Rehydrate { .. } => "REPLAY_REHYDRATE",
            Self::Rejected { .. } => "REPLAY_REJECTED",
        }
    }
}

/// Incremental replayer that folds log entries into an owned state.
#[derive(Clone, Debug)]
pub struct Replayer {
    state: GameState,
}

impl Replayer {
    /// Starts from an initial state (position 0).
    pub fn new(initial: GameState) -> Self {
        Self { state: initial }
    }

    /// Starts from a snapshot, checking that it is self-consistent.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, ReplayError> {
        if snapshot.state.applied != snapshot.sequence {
            return Err(ReplayError::SnapshotMismatch {
                sequence: snapshot.sequence,
                applied: snapshot.state.applied,
            });
        }
        Ok(Self::new(snapshot.state.clone()))
    }

    /// Log position of the current state.
    pub fn position(&self) -> u64 {
        self.state.applied
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Applies the next entry. On error the state is left unchanged.
    pub fn step(&mut self, entry: &LoggedAction) -> Result<(), ReplayError> {
        let expected = self.position();
        if entry.sequence != expected {
            return Err(ReplayError::SequenceMismatch {
                expected,
                found: entry.sequence,
            });
        }

        let bound = entry
            .action
            .rehydrate(&self.state)
            .map_err(|source| ReplayError::Rehydrate {
                sequence: entry.sequence,
                source,
            })?;

        GameEngine::new(&mut self.state)
            .execute(&bound)
            .map_err(|source| ReplayError::Rejected {
                sequence: entry.sequence,
                kind: bound.kind(),
                source,
            })
    }

    pub fn run<'a, I>(&mut self, entries: I) -> Result<(), ReplayError>
    where
        I: IntoIterator<Item = &'a LoggedAction>,
    {
        entries.into_iter().try_for_each(|entry| self.step(entry))
    }

    pub fn into_state(self) -> GameState {
        self.state
    }
}

/// Folds `entries` over `initial`.
pub fn replay(initial: &GameState, entries: &[LoggedAction]) -> Result<GameState, ReplayError> {
    let mut replayer = Replayer::new(initial.clone());
    replayer.run(entries)?;
    Ok(replayer.into_state())
}

/// Folds the entries following `snapshot` over its state.
///
/// `tail` must start at `snapshot.sequence`.
pub fn replay_from(snapshot: &Snapshot, tail: &[LoggedAction]) -> Result<GameState, ReplayError> {
    let mut replayer = Replayer::from_snapshot(snapshot)?;
    replayer.run(tail)?;
    Ok(replayer.into_state())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::log::ActionLog;
    use crate::setup::GameSetup;

    fn initial() -> GameState {
        let setup = GameSetup::new()
            .with_entity("PRR", 2)
            .with_entity("NYC", 2)
            .with_location("E5", 2, 20)
            .with_location("F6", 1, 10);
        GameState::from_setup(&setup).unwrap()
    }

    fn log() -> ActionLog {
        let mut log = ActionLog::new();
        log.append(Action::place_token("PRR", "E5", 0));
        log.append(Action::place_token("NYC", "E5", 1));
        log.append(Action::place_token("PRR", "F6", 0));
        log.append(Action::pass("NYC"));
        log
    }

    #[test]
    fn replay_from_any_snapshot_matches_full_replay() {
        let initial = initial();
        let log = log();
        let full = replay(&initial, log.entries()).unwrap();
        assert_eq!(full.applied, log.len());

        for k in 0..=log.len() {
            let prefix = replay(&initial, &log.entries()[..k as usize]).unwrap();
            let snapshot = Snapshot::new(prefix);
            assert_eq!(snapshot.sequence, k);
            let resumed = replay_from(&snapshot, log.tail(k)).unwrap();
            assert_eq!(resumed, full);
        }
    }

    #[test]
    fn entries_that_no_longer_validate_abort_replay() {
        let initial = initial();
        let mut log = ActionLog::new();
        log.append(Action::place_token("PRR", "E5", 0));
        log.append(Action::place_token("NYC", "E5", 0));

        let error = replay(&initial, log.entries()).unwrap_err();
        assert!(matches!(
            error,
            ReplayError::Rejected {
                sequence: 1,
                kind: ActionKind::PlaceToken,
                ..
            }
        ));
    }

    #[test]
    fn entries_for_unknown_entities_abort_replay() {
        let initial = initial();
        let mut log = ActionLog::new();
        log.append(Action::pass("Erie"));

        assert_eq!(
            replay(&initial, log.entries()),
            Err(ReplayError::Rehydrate {
                sequence: 0,
                source: RehydrateError::UnknownEntity {
                    name: "Erie".into()
                },
            })
        );
    }

    #[test]
    fn gaps_and_inconsistent_snapshots_are_detected() {
        let initial = initial();
        let log = log();
        assert_eq!(
            replay(&initial, log.tail(1)),
            Err(ReplayError::SequenceMismatch {
                expected: 0,
                found: 1
            })
        );

        let forged = Snapshot {
            sequence: 3,
            state: initial,
        };
        assert_eq!(
            replay_from(&forged, log.tail(3)),
            Err(ReplayError::SnapshotMismatch {
                sequence: 3,
                applied: 0
            })
        );
    }
}
