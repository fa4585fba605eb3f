//! Unified error types surfaced by sessions and the runtime API.
//!
//! Session errors fall into two families with different consequences:
//! - [`ValidationError`]: a new action was rejected. Log and state are
//!   untouched and the caller may submit something else.
//! - [`DataIntegrityError`]: an already accepted log no longer replays. The
//!   session halts and rejects every further mutation.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{
    ErrorSeverity, ExecuteError, GameError, InitializationError, LogError, RehydrateError,
    ReplayError,
};

pub use crate::repository::RepositoryError;
use crate::repository::GameId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// A submitted action was rejected before touching the log.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("action cannot be bound to this game: {0}")]
    Rehydrate(#[source] RehydrateError),

    #[error("action rejected: {0}")]
    Rejected(#[source] ExecuteError),
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rehydrate(error) => error.error_code(),
            Self::Rejected(error) => error.error_code(),
        }
    }
}

/// The log, a snapshot or the derived state is inconsistent.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DataIntegrityError {
    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("snapshot at sequence {sequence} is past the end of the log ({len} entries)")]
    SnapshotBeyondLog { sequence: u64, len: u64 },

    #[error("replayed state {expected} differs from live state {actual}")]
    Diverged { expected: String, actual: String },

    #[error("initial state is missing")]
    MissingInitialState,

    #[error("initial state has {applied} actions applied; it must be the state at position 0")]
    InitialStateNotAtZero { applied: u64 },

    #[error("persisted log no longer matches the session ({live} entries): {reason}")]
    PersistedLogDiverged { live: u64, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("data integrity failure: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("cannot undo to {requested}: log has {len} entries")]
    InvalidUndoTarget { requested: i64, len: u64 },

    #[error("cannot fork at {at}: log has {len} entries")]
    InvalidForkPoint { at: u64, len: u64 },

    #[error("game is finished")]
    Finished,

    #[error("session halted: {reason}")]
    Halted { reason: String },

    #[error("prepared action for sequence {found} is stale (next sequence is {expected})")]
    StalePreparation { expected: u64, found: u64 },
}

impl SessionError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(ValidationError::Rejected(error)) => error.severity(),
            Self::Validation(ValidationError::Rehydrate(_)) => ErrorSeverity::Validation,
            Self::InvalidUndoTarget { .. } | Self::InvalidForkPoint { .. } | Self::Finished => {
                ErrorSeverity::Validation
            }
            Self::StalePreparation { .. } => ErrorSeverity::Internal,
            Self::DataIntegrity(_) | Self::Halted { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns true if the game can keep accepting actions after this error.
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }
}

impl From<ReplayError> for SessionError {
    fn from(error: ReplayError) -> Self {
        Self::DataIntegrity(DataIntegrityError::Replay(error))
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("game {0} already exists")]
    GameAlreadyExists(GameId),

    #[error("failed to initialize game state")]
    InitialState(#[source] InitializationError),
}

impl RuntimeError {
    /// The session error behind this failure, if any.
    pub fn as_session(&self) -> Option<&SessionError> {
        match self {
            Self::Session(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_separates_rejections_from_corruption() {
        let not_your_turn = SessionError::Validation(ValidationError::Rejected(
            ExecuteError::ActorNotActing {
                actor: "NYC".into(),
                acting: "PRR".into(),
            },
        ));
        assert!(not_your_turn.is_recoverable());
        assert!(
            SessionError::InvalidUndoTarget {
                requested: -1,
                len: 0
            }
            .is_recoverable()
        );

        let corrupt = SessionError::DataIntegrity(DataIntegrityError::MissingInitialState);
        assert!(!corrupt.is_recoverable());
        assert!(corrupt.severity().is_data_integrity());
    }
}
