//! Lobby metadata and read-only game summaries.
//!
//! None of this feeds replay. Seating order is derived here once, turned
//! into an explicit [`TurnOrder`] and then fixed in the initial state.

use serde::{Deserialize, Serialize};

use game_core::{
    EntityName, GameResult, GameSetup, GameState, GameStatus, LocationSpec, TurnOrder,
    setup::seeded_shuffle,
};

use crate::repository::GameId;

/// Seed used when a game's settings do not carry one.
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u64,
    pub name: String,
}

impl PlayerInfo {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub seed: Option<u64>,
    #[serde(default)]
    pub private_game: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub title: String,
    pub description: String,
    pub owner: PlayerInfo,
    pub players: Vec<PlayerInfo>,
    pub max_players: usize,
    pub settings: GameSettings,
    /// Unix timestamp in seconds.
    pub created_at: u64,
}

impl GameMetadata {
    pub fn is_private(&self) -> bool {
        self.settings.private_game
    }

    /// Players sorted by id, then shuffled with the game's seed.
    pub fn ordered_players(&self) -> Vec<&PlayerInfo> {
        let mut players: Vec<&PlayerInfo> = self.players.iter().collect();
        players.sort_by_key(|player| player.id);
        seeded_shuffle(&mut players, self.settings.seed.unwrap_or(DEFAULT_SEED));
        players
    }

    /// Seating order for a game whose entities are named after the players.
    pub fn turn_order(&self) -> TurnOrder {
        TurnOrder::Explicit(
            self.ordered_players()
                .into_iter()
                .map(|player| EntityName::new(player.name.as_str()))
                .collect(),
        )
    }

    /// Initial-state parameters with one entity per player.
    pub fn game_setup(&self, tokens_per_player: u32, locations: Vec<LocationSpec>) -> GameSetup {
        let mut players: Vec<&PlayerInfo> = self.players.iter().collect();
        players.sort_by_key(|player| player.id);

        let setup = players
            .into_iter()
            .fold(GameSetup::new(), |setup, player| {
                setup.with_entity(player.name.as_str(), tokens_per_player)
            })
            .with_turn_order(self.turn_order());
        GameSetup {
            locations,
            ..setup
        }
    }
}

/// What a presentation layer needs to list or show a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub title: String,
    pub description: String,
    pub owner: PlayerInfo,
    pub players: Vec<PlayerInfo>,
    pub max_players: usize,
    pub private_game: bool,
    pub status: GameStatus,
    pub turn: u32,
    pub round: u32,
    pub acting: Vec<EntityName>,
    pub result: Option<GameResult>,
    pub actions: u64,
    pub created_at: u64,
}

impl GameSummary {
    pub fn new(id: GameId, metadata: &GameMetadata, state: &GameState) -> Self {
        Self {
            id,
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            owner: metadata.owner.clone(),
            players: metadata.ordered_players().into_iter().cloned().collect(),
            max_players: metadata.max_players,
            private_game: metadata.is_private(),
            status: state.status(),
            turn: state.turn.turn,
            round: state.turn.round,
            acting: state.acting_names().into_iter().cloned().collect(),
            result: state.result.clone(),
            actions: state.applied,
            created_at: metadata.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(seed: Option<u64>) -> GameMetadata {
        GameMetadata {
            title: "1830".into(),
            description: "friendly".into(),
            owner: PlayerInfo::new(3, "carol"),
            players: vec![
                PlayerInfo::new(3, "carol"),
                PlayerInfo::new(1, "alice"),
                PlayerInfo::new(2, "bob"),
            ],
            max_players: 4,
            settings: GameSettings {
                seed,
                private_game: false,
            },
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn ordering_depends_only_on_ids_and_seed() {
        let a = metadata(None);
        let mut b = metadata(Some(DEFAULT_SEED));
        b.players.reverse();

        let names = |m: &GameMetadata| {
            m.ordered_players()
                .into_iter()
                .map(|p| p.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&a), names(&b));
        assert_eq!(names(&a).len(), 3);
    }

    #[test]
    fn setup_seats_players_in_metadata_order() {
        let metadata = metadata(Some(7));
        let setup = metadata.game_setup(2, vec![LocationSpec::new("E5", 2, 20)]);
        let state = GameState::from_setup(&setup).unwrap();

        let seated: Vec<String> = state
            .turn
            .order
            .iter()
            .map(|id| state.entities.get(*id).unwrap().name.to_string())
            .collect();
        let expected: Vec<String> = metadata
            .ordered_players()
            .into_iter()
            .map(|p| p.name.clone())
            .collect();
        assert_eq!(seated, expected);

        let summary = GameSummary::new(GameId::new("g").unwrap(), &metadata, &state);
        assert_eq!(summary.status, GameStatus::New);
        assert_eq!(summary.acting.len(), 1);
        assert_eq!(summary.acting[0].as_str(), expected[0]);
    }
}
