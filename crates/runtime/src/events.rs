//! Per-game notifications published by session workers.
//!
//! Events are delivered on a `tokio::sync::broadcast` channel. Delivery is
//! best effort: a slow subscriber may observe `RecvError::Lagged`, and events
//! sent while nobody listens are dropped. The action log stays the record.

use serde::{Deserialize, Serialize};

use game_core::{ActionKind, EntityName, GameResult};

use crate::repository::GameId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameEvent {
    /// An action was appended to the log and applied.
    ActionApplied {
        game_id: GameId,
        sequence: u64,
        kind: ActionKind,
        entity: EntityName,
        /// Hex SHA-256 of the resulting state.
        state_hash: String,
    },

    /// A submitted action failed validation. The log is unchanged.
    ActionRejected {
        game_id: GameId,
        kind: ActionKind,
        entity: EntityName,
        error: String,
    },

    /// The log was truncated to `to` entries.
    Undone { game_id: GameId, to: u64 },

    /// The game reached its terminal state.
    Finished { game_id: GameId, result: GameResult },

    /// Replay or persistence found the game corrupt; the session is halted.
    IntegrityFailure { game_id: GameId, error: String },
}

impl GameEvent {
    /// Snake-case variant name, as used in the JSON `type` tag.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn game_id(&self) -> &GameId {
        match self {
            Self::ActionApplied { game_id, .. }
            | Self::ActionRejected { game_id, .. }
            | Self::Undone { game_id, .. }
            | Self::Finished { game_id, .. }
            | Self::IntegrityFailure { game_id, .. } => game_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_tagged_with_the_event_name() {
        let event = GameEvent::Undone {
            game_id: GameId::new("1830").unwrap(),
            to: 3,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        assert_eq!(json["type"], "undone");
        assert_eq!(json["game_id"], "1830");
        assert_eq!(json["to"], 3);
    }
}
