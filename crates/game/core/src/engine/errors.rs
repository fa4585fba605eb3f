//! Error types for the action execution pipeline.

use crate::action::{ActionTransition, PlaceTokenAction};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, EntityName};

/// Errors surfaced while validating or executing a bound action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("game is finished")]
    GameFinished,

    #[error("actor {0} is not part of this game")]
    UnknownActor(EntityId),

    #[error("{0} has resigned and can no longer act")]
    ActorResigned(EntityName),

    #[error("{actor} is not acting (waiting on {acting})")]
    ActorNotActing { actor: EntityName, acting: EntityName },

    #[error("place token action failed: {0}")]
    PlaceToken(<PlaceTokenAction as ActionTransition>::Error),
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActorNotActing { .. } => ErrorSeverity::Recoverable,
            Self::GameFinished | Self::UnknownActor(_) | Self::ActorResigned(_) => {
                ErrorSeverity::Validation
            }
            Self::PlaceToken(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::GameFinished => "GAME_FINISHED",
            Self::UnknownActor(_) => "UNKNOWN_ACTOR",
            Self::ActorResigned(_) => "ACTOR_RESIGNED",
            Self::ActorNotActing { .. } => "ACTOR_NOT_ACTING",
            Self::PlaceToken(error) => error.error_code(),
        }
    }
}
