//! Authoritative game state representation.
//!
//! This module owns the data structures that describe entities, board
//! occupancy, turn bookkeeping and the terminal result. Runtime layers clone
//! or query this state but mutate it exclusively through the engine.
pub mod types;

use std::collections::BTreeMap;

pub use types::{
    BoardState, EntitiesState, EntityId, EntityName, EntityState, LocationId, LocationState,
    TurnState,
};

/// Lifecycle of a game as seen from its derived state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GameStatus {
    /// No action has been applied yet.
    New,
    /// At least one action applied and no final result.
    Active,
    /// Terminal; no further action is accepted.
    Finished,
}

/// Final standings, keyed by stable entity name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameResult {
    pub scores: BTreeMap<EntityName, u32>,
}

impl GameResult {
    /// Entities sharing the highest score, in name order.
    pub fn winners(&self) -> Vec<&EntityName> {
        let Some(best) = self.scores.values().copied().max() else {
            return Vec::new();
        };
        self.scores
            .iter()
            .filter(|(_, score)| **score == best)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Canonical snapshot of the deterministic game state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// Number of log entries folded into this state.
    ///
    /// Equals the length of the action log this state was derived from.
    pub applied: u64,

    pub entities: EntitiesState,
    pub board: BoardState,
    pub turn: TurnState,

    /// Set exactly once, by the action that ends the game.
    pub result: Option<GameResult>,
}

impl GameState {
    /// Creates a fresh state from the provided sub-components.
    pub fn new(entities: EntitiesState, board: BoardState, turn: TurnState) -> Self {
        Self {
            applied: 0,
            entities,
            board,
            turn,
            result: None,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.result.is_some() {
            GameStatus::Finished
        } else if self.applied == 0 {
            GameStatus::New
        } else {
            GameStatus::Active
        }
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Entity whose turn it is, or `None` once the game is finished.
    pub fn current_actor(&self) -> Option<EntityId> {
        if self.is_finished() {
            return None;
        }
        self.turn.current()
    }

    /// Entities expected to act next. Empty once the game is finished.
    pub fn acting(&self) -> Vec<EntityId> {
        self.current_actor().into_iter().collect()
    }

    /// Stable names of the acting entities.
    pub fn acting_names(&self) -> Vec<&EntityName> {
        self.acting()
            .into_iter()
            .filter_map(|id| self.entities.get(id).map(|entity| &entity.name))
            .collect()
    }
}
