//! Session worker that owns one game's [`GameSession`].
//!
//! Receives commands from [`crate::GameHandle`], persists every accepted
//! action before committing it, publishes the new state on a `watch` channel
//! and emits [`GameEvent`] notifications.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, trace, warn};

use game_core::{Action, ActionKind, EntityName, GameState, LoggedAction, Snapshot};

use crate::api::{DataIntegrityError, Result, RuntimeError, SessionError};
use crate::events::GameEvent;
use crate::repository::{ActionRepository, GameId, RepositoryError, SnapshotRepository};
use crate::session::GameSession;
use crate::utils::{hash_game_state, short_hash};

/// Commands that can be sent to a session worker.
pub(crate) enum Command {
    /// Validate, persist and apply an action.
    Submit {
        action: Action,
        reply: oneshot::Sender<Result<Arc<GameState>>>,
    },
    /// Truncate the log to `to` entries.
    Undo {
        to: i64,
        reply: oneshot::Sender<Result<Arc<GameState>>>,
    },
    /// Log entries with `sequence >= from`.
    Actions {
        from: u64,
        reply: oneshot::Sender<Vec<LoggedAction>>,
    },
    /// Current state as a snapshot.
    Export { reply: oneshot::Sender<Snapshot> },
    /// Independent session holding the first `at` entries.
    Fork {
        at: u64,
        game_id: GameId,
        reply: oneshot::Sender<Result<GameSession>>,
    },
    /// Full replay audit.
    Verify { reply: oneshot::Sender<Result<()>> },
    /// Stop processing commands.
    Shutdown,
}

/// Background task that serializes every mutation of one game.
pub(crate) struct SessionWorker {
    session: GameSession,
    actions: Arc<dyn ActionRepository>,
    snapshots: Arc<dyn SnapshotRepository>,
    command_rx: mpsc::Receiver<Command>,
    state_tx: watch::Sender<Arc<GameState>>,
    event_tx: broadcast::Sender<GameEvent>,
}

impl SessionWorker {
    pub(crate) fn new(
        session: GameSession,
        actions: Arc<dyn ActionRepository>,
        snapshots: Arc<dyn SnapshotRepository>,
        command_rx: mpsc::Receiver<Command>,
        state_tx: watch::Sender<Arc<GameState>>,
        event_tx: broadcast::Sender<GameEvent>,
    ) -> Self {
        Self {
            session,
            actions,
            snapshots,
            command_rx,
            state_tx,
            event_tx,
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        info!(
            target: "runtime::worker",
            game = %self.session.game_id(),
            len = self.session.len(),
            "session worker started"
        );

        while let Some(command) = self.command_rx.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle_command(command);
        }

        info!(
            target: "runtime::worker",
            game = %self.session.game_id(),
            "session worker stopped"
        );
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { action, reply } => {
                let result = self.submit(action);
                let _ = reply.send(result);
            }
            Command::Undo { to, reply } => {
                let result = self.undo(to);
                let _ = reply.send(result);
            }
            Command::Actions { from, reply } => {
                let _ = reply.send(self.session.log().tail(from).to_vec());
            }
            Command::Export { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Fork { at, game_id, reply } => {
                let result = self.session.fork(at, game_id).map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::Verify { reply } => {
                let result = self.verify();
                let _ = reply.send(result);
            }
            Command::Shutdown => {}
        }
    }

    fn game_id(&self) -> GameId {
        self.session.game_id().clone()
    }

    fn submit(&mut self, action: Action) -> Result<Arc<GameState>> {
        let kind = action.kind();
        let entity = action.entity().clone();

        let prepared = match self.session.prepare(action) {
            Ok(prepared) => prepared,
            Err(error) => {
                self.report_rejection(kind, entity, &error);
                return Err(error.into());
            }
        };

        let game_id = self.game_id();
        let sequence = prepared.entry().sequence;

        // Persist before commit: a failed write leaves the session untouched.
        if let Err(error) = self.actions.append(&game_id, prepared.entry()) {
            warn!(
                target: "runtime::worker",
                game = %game_id,
                sequence,
                error = %error,
                "failed to persist action"
            );
            return Err(error.into());
        }

        if let Some(snapshot) = prepared.snapshot()
            && let Err(error) = self.snapshots.save(&game_id, &snapshot)
        {
            warn!(
                target: "runtime::worker",
                game = %game_id,
                sequence,
                error = %error,
                "failed to persist snapshot"
            );
        }

        let state = match self.session.commit(prepared) {
            Ok(state) => state,
            Err(error) => {
                if let Err(rollback) = self.actions.truncate(&game_id, sequence) {
                    warn!(
                        target: "runtime::worker",
                        game = %game_id,
                        error = %rollback,
                        "failed to roll back persisted action"
                    );
                }
                return Err(error.into());
            }
        };

        self.state_tx.send_replace(Arc::clone(&state));

        let state_hash = hash_game_state(&state).unwrap_or_else(|error| {
            warn!(
                target: "runtime::worker",
                game = %game_id,
                error = %error,
                "failed to hash state"
            );
            String::new()
        });
        debug!(
            target: "runtime::worker",
            game = %game_id,
            sequence,
            kind = kind.as_snake_case(),
            entity = %entity,
            state = short_hash(&state_hash),
            "action applied"
        );
        self.emit(GameEvent::ActionApplied {
            game_id: game_id.clone(),
            sequence,
            kind,
            entity,
            state_hash,
        });

        if let Some(result) = &state.result {
            info!(
                target: "runtime::worker",
                game = %game_id,
                sequence,
                "game finished"
            );
            self.emit(GameEvent::Finished {
                game_id,
                result: result.clone(),
            });
        }

        Ok(state)
    }

    fn undo(&mut self, to: i64) -> Result<Arc<GameState>> {
        let target = self.session.undo_target(to)?;
        let game_id = self.game_id();

        // Snapshots go before the log: an uncut log replays without them.
        self.snapshots.delete_after(&game_id, target)?;
        if let Err(error) = self.actions.truncate(&game_id, target) {
            return Err(self.truncate_failed(&game_id, error));
        }

        let state = match self.session.undo(to) {
            Ok(state) => state,
            Err(error) => {
                self.report_integrity(&error);
                return Err(error.into());
            }
        };

        self.state_tx.send_replace(Arc::clone(&state));
        self.emit(GameEvent::Undone {
            game_id,
            to: target,
        });
        Ok(state)
    }

    /// A failed truncation may still have cut the stored log. If the stored
    /// length no longer matches the session, the game halts.
    fn truncate_failed(&mut self, game_id: &GameId, error: RepositoryError) -> RuntimeError {
        let live = self.session.len();
        let reason = match self.actions.len(game_id) {
            Ok(persisted) if persisted == live => {
                warn!(
                    target: "runtime::worker",
                    game = %game_id,
                    error = %error,
                    "failed to truncate persisted log"
                );
                return error.into();
            }
            Ok(persisted) => {
                format!("truncation failed after cutting to {persisted} entries: {error}")
            }
            Err(len_error) => {
                format!("truncation failed ({error}) and the stored length is unreadable: {len_error}")
            }
        };

        let failure = self
            .session
            .integrity_failure(DataIntegrityError::PersistedLogDiverged { live, reason });
        self.report_integrity(&failure);
        failure.into()
    }

    fn verify(&mut self) -> Result<()> {
        self.session.verify().map_err(|error| {
            self.report_integrity(&error);
            error.into()
        })
    }

    fn report_rejection(&self, kind: ActionKind, entity: EntityName, error: &SessionError) {
        debug!(
            target: "runtime::worker",
            game = %self.session.game_id(),
            kind = kind.as_snake_case(),
            entity = %entity,
            error = %error,
            "action rejected"
        );
        self.emit(GameEvent::ActionRejected {
            game_id: self.game_id(),
            kind,
            entity,
            error: error.to_string(),
        });
    }

    fn report_integrity(&self, error: &SessionError) {
        if let SessionError::DataIntegrity(inner) = error {
            error!(
                target: "runtime::worker",
                game = %self.session.game_id(),
                error = %inner,
                "data integrity failure"
            );
            self.emit(GameEvent::IntegrityFailure {
                game_id: self.game_id(),
                error: inner.to_string(),
            });
        }
    }

    fn emit(&self, event: GameEvent) {
        trace!(
            target: "runtime::worker",
            game = %event.game_id(),
            event = event.name(),
            subscribers = self.event_tx.receiver_count(),
            "emit event"
        );
        // No subscribers is not an error.
        let _ = self.event_tx.send(event);
    }
}
