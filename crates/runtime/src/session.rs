//! Game session: the only mutator of one game's action log and state.
//!
//! A [`GameSession`] owns the initial state, the [`ActionLog`], the current
//! derived state and a [`SnapshotCache`]. It is synchronous; the session
//! worker wraps it to serialize access per game and to persist between the
//! two halves of a submission ([`GameSession::prepare`] and
//! [`GameSession::commit`]).
//!
//! Reads hand out `Arc<GameState>`: a reader always sees a complete state
//! from before or after a mutation, never one in between.

use std::sync::Arc;

use tracing::{debug, error, info};

use game_core::{
    Action, ActionLog, GameState, GameStatus, LoggedAction, Snapshot, engine, replay,
    replay_from,
};

use crate::api::{DataIntegrityError, SessionError, ValidationError};
use crate::config::RuntimeConfig;
use crate::repository::GameId;
use crate::snapshot::SnapshotCache;
use crate::utils::hash_game_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Actions between cached snapshots (0 keeps only the initial one).
    pub snapshot_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 10,
        }
    }
}

impl From<&RuntimeConfig> for SessionConfig {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            snapshot_interval: config.snapshot_interval,
        }
    }
}

/// A validated action and the state it produces, not yet in the log.
///
/// Only the session that prepared it can commit it, and only while nothing
/// else has been committed in between.
#[derive(Debug, Clone)]
pub struct PreparedAction {
    entry: LoggedAction,
    base: Arc<GameState>,
    state: Arc<GameState>,
    take_snapshot: bool,
}

impl PreparedAction {
    /// The log entry that will be appended.
    pub fn entry(&self) -> &LoggedAction {
        &self.entry
    }

    /// State after the action.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Snapshot to persist alongside the entry, if this position is a
    /// snapshot point.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.take_snapshot
            .then(|| Snapshot::new(GameState::clone(&self.state)))
    }
}

pub struct GameSession {
    game_id: GameId,
    initial: Arc<GameState>,
    log: ActionLog,
    state: Arc<GameState>,
    snapshots: SnapshotCache,
    config: SessionConfig,
    halted: Option<String>,
}

impl GameSession {
    /// Starts a new game at log position 0.
    pub fn new(game_id: GameId, initial: GameState, config: SessionConfig) -> Self {
        let initial = Arc::new(initial);
        Self {
            game_id,
            snapshots: SnapshotCache::new(Arc::clone(&initial), config.snapshot_interval),
            state: Arc::clone(&initial),
            initial,
            log: ActionLog::new(),
            config,
            halted: None,
        }
    }

    /// Rebuilds a session from persisted data.
    ///
    /// Replays `entries` from `snapshot` when given (it must not lie past the
    /// end of the log), otherwise from `initial`. Any inconsistency is a
    /// data-integrity failure.
    pub fn restore(
        game_id: GameId,
        initial: GameState,
        entries: Vec<LoggedAction>,
        snapshot: Option<Snapshot>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        if initial.applied != 0 {
            return Err(DataIntegrityError::InitialStateNotAtZero {
                applied: initial.applied,
            }
            .into());
        }
        let log = ActionLog::from_entries(entries).map_err(DataIntegrityError::Log)?;
        let start = snapshot.unwrap_or_else(|| Snapshot::initial(initial.clone()));
        if start.sequence > log.len() {
            return Err(DataIntegrityError::SnapshotBeyondLog {
                sequence: start.sequence,
                len: log.len(),
            }
            .into());
        }

        let state = replay_from(&start, log.tail(start.sequence))?;

        let mut session = Self::new(game_id, initial, config);
        if start.sequence > 0 {
            session
                .snapshots
                .insert(start.sequence, Arc::new(start.state));
        }
        session.state = Arc::new(state);
        session.log = log;

        info!(
            target: "runtime::session",
            game = %session.game_id,
            from_snapshot = start.sequence,
            len = session.log.len(),
            status = %session.status(),
            "restored session"
        );
        Ok(session)
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn initial_state(&self) -> &GameState {
        &self.initial
    }

    /// Immutable view of the current state.
    pub fn current_state(&self) -> Arc<GameState> {
        Arc::clone(&self.state)
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn len(&self) -> u64 {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    /// Exports the current state as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(GameState::clone(&self.state))
    }

    /// Stops accepting mutations. Reads keep working.
    pub fn halt(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        error!(
            target: "runtime::session",
            game = %self.game_id,
            reason = %reason,
            "session halted"
        );
        self.halted.get_or_insert(reason);
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match &self.halted {
            Some(reason) => Err(SessionError::Halted {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Rehydrates and validates `action` against the current state and
    /// computes its successor without touching the session.
    pub fn prepare(&self, action: Action) -> Result<PreparedAction, SessionError> {
        self.ensure_running()?;

        let bound = action
            .rehydrate(self.state.as_ref())
            .map_err(ValidationError::Rehydrate)?;
        let next = engine::apply(&self.state, &bound).map_err(ValidationError::Rejected)?;

        let sequence = self.log.len();
        Ok(PreparedAction {
            entry: LoggedAction::new(sequence, action),
            base: Arc::clone(&self.state),
            state: Arc::new(next),
            take_snapshot: self.snapshots.should_snapshot(sequence + 1),
        })
    }

    /// Appends a prepared action and publishes its state.
    pub fn commit(&mut self, prepared: PreparedAction) -> Result<Arc<GameState>, SessionError> {
        self.ensure_running()?;

        let expected = self.log.len();
        if prepared.entry.sequence != expected || !Arc::ptr_eq(&prepared.base, &self.state) {
            return Err(SessionError::StalePreparation {
                expected,
                found: prepared.entry.sequence,
            });
        }

        let PreparedAction {
            entry,
            state,
            take_snapshot,
            ..
        } = prepared;
        let kind = entry.action.kind();
        self.log.append(entry.action);
        if take_snapshot {
            self.snapshots.insert(self.log.len(), Arc::clone(&state));
        }
        self.state = state;

        debug!(
            target: "runtime::session",
            game = %self.game_id,
            sequence = expected,
            kind = kind.as_snake_case(),
            "action committed"
        );
        Ok(Arc::clone(&self.state))
    }

    /// Validates, appends and applies `action` in one step.
    ///
    /// On failure the log and state are unchanged.
    pub fn submit_action(&mut self, action: Action) -> Result<Arc<GameState>, SessionError> {
        let prepared = self.prepare(action)?;
        self.commit(prepared)
    }

    /// Checks an undo request without performing it. Returns the target
    /// length.
    pub fn undo_target(&self, to: i64) -> Result<u64, SessionError> {
        self.ensure_running()?;
        if self.state.is_finished() {
            return Err(SessionError::Finished);
        }

        let len = self.log.len();
        match u64::try_from(to) {
            Ok(target) if target <= len => Ok(target),
            _ => Err(SessionError::InvalidUndoTarget {
                requested: to,
                len,
            }),
        }
    }

    /// Truncates the log to `to` entries and re-derives the state from the
    /// nearest cached snapshot.
    ///
    /// A replay failure means the log was corrupt; the session halts.
    pub fn undo(&mut self, to: i64) -> Result<Arc<GameState>, SessionError> {
        let target = self.undo_target(to)?;

        let Some(start) = self.snapshots.nearest_at_or_before(target) else {
            return Err(self.integrity_failure(DataIntegrityError::MissingInitialState));
        };
        let entries = &self.log.entries()[start.sequence as usize..target as usize];
        let state = match replay_from(&start, entries) {
            Ok(state) => state,
            Err(error) => return Err(self.integrity_failure(error.into())),
        };

        self.log.truncate(target);
        self.snapshots.discard_after(target);
        self.state = Arc::new(state);

        info!(
            target: "runtime::session",
            game = %self.game_id,
            to = target,
            from_snapshot = start.sequence,
            "undo"
        );
        Ok(Arc::clone(&self.state))
    }

    /// Builds an independent session holding the first `at` entries of this
    /// log, replayed from the initial state.
    pub fn fork(&self, at: u64, game_id: GameId) -> Result<GameSession, SessionError> {
        let len = self.log.len();
        if at > len {
            return Err(SessionError::InvalidForkPoint { at, len });
        }

        let entries = self.log.entries()[..at as usize].to_vec();
        let forked = Self::restore(
            game_id,
            GameState::clone(&self.initial),
            entries,
            None,
            self.config,
        )?;

        info!(
            target: "runtime::session",
            source = %self.game_id,
            game = %forked.game_id,
            at,
            "forked session"
        );
        Ok(forked)
    }

    /// Replays the whole log from the initial state and compares the result
    /// with the live state. A mismatch halts the session.
    pub fn verify(&mut self) -> Result<(), SessionError> {
        let replayed = match replay(&self.initial, self.log.entries()) {
            Ok(state) => state,
            Err(error) => return Err(self.integrity_failure(error.into())),
        };

        if replayed != *self.state {
            let fingerprint = |state: &GameState| {
                hash_game_state(state).unwrap_or_else(|error| format!("<unhashable: {error}>"))
            };
            let error = DataIntegrityError::Diverged {
                expected: fingerprint(&replayed),
                actual: fingerprint(self.state.as_ref()),
            };
            return Err(self.integrity_failure(error));
        }
        Ok(())
    }

    /// Halts the session and wraps `error` for the caller.
    pub(crate) fn integrity_failure(&mut self, error: DataIntegrityError) -> SessionError {
        self.halt(error.to_string());
        SessionError::DataIntegrity(error)
    }
}
