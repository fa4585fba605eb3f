//! Initial-state construction.
//!
//! A [`GameSetup`] is the complete, explicit parameter set of a game's initial
//! state. Seating order is one of those parameters: it is resolved here once
//! and never derived from the action log.
pub mod rng;

use std::collections::BTreeSet;

pub use rng::{PcgRng, RngOracle, compute_seed, seeded_shuffle};

use crate::error::{ErrorSeverity, GameError};
use crate::state::{
    BoardState, EntitiesState, EntityId, EntityName, GameState, LocationId, LocationState,
    TurnState,
};

/// Errors raised while building an initial state from a [`GameSetup`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitializationError {
    #[error("setup declares no entities")]
    EmptyRoster,

    #[error("entity {0} declared more than once")]
    DuplicateEntity(EntityName),

    #[error("location {0} declared more than once")]
    DuplicateLocation(LocationId),

    #[error("location {0} has no token slots")]
    NoSlots(LocationId),

    #[error("turn order names unknown entity {0}")]
    UnknownEntityInOrder(EntityName),

    #[error("turn order must list each of the {expected} entities exactly once (got {found})")]
    IncompleteOrder { expected: usize, found: usize },
}

impl GameError for InitializationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRoster => "SETUP_EMPTY_ROSTER",
            Self::DuplicateEntity(_) => "SETUP_DUPLICATE_ENTITY",
            Self::DuplicateLocation(_) => "SETUP_DUPLICATE_LOCATION",
            Self::NoSlots(_) => "SETUP_NO_SLOTS",
            Self::UnknownEntityInOrder(_) => "SETUP_UNKNOWN_ENTITY_IN_ORDER",
            Self::IncompleteOrder { .. } => "SETUP_INCOMPLETE_ORDER",
        }
    }
}

/// Acting entity declared at setup.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitySpec {
    pub name: EntityName,
    pub tokens: u32,
}

impl EntitySpec {
    pub fn new(name: impl Into<EntityName>, tokens: u32) -> Self {
        Self {
            name: name.into(),
            tokens,
        }
    }
}

/// Board location declared at setup.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationSpec {
    pub id: LocationId,
    pub slots: usize,
    pub revenue: u32,
}

impl LocationSpec {
    pub fn new(id: impl Into<LocationId>, slots: usize, revenue: u32) -> Self {
        Self {
            id: id.into(),
            slots,
            revenue,
        }
    }
}

/// How the seating order is resolved at setup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnOrder {
    /// Declaration order.
    #[default]
    Listed,
    /// Exactly this order; must be a permutation of the roster.
    Explicit(Vec<EntityName>),
    /// Declaration order shuffled deterministically with the given seed.
    Seeded(u64),
}

impl TurnOrder {
    fn resolve(&self, entities: &EntitiesState) -> Result<Vec<EntityId>, InitializationError> {
        let mut order: Vec<EntityId> = entities.iter().map(|entity| entity.id).collect();
        match self {
            TurnOrder::Listed => {}
            TurnOrder::Seeded(seed) => seeded_shuffle(&mut order, *seed),
            TurnOrder::Explicit(names) => {
                if names.len() != entities.len() {
                    return Err(InitializationError::IncompleteOrder {
                        expected: entities.len(),
                        found: names.len(),
                    });
                }
                let mut seen = BTreeSet::new();
                order = names
                    .iter()
                    .map(|name| -> Result<EntityId, InitializationError> {
                        let entity = entities
                            .by_name(name)
                            .ok_or_else(|| InitializationError::UnknownEntityInOrder(name.clone()))?;
                        Ok(entity.id)
                    })
                    .collect::<Result<_, _>>()?;
                order.retain(|id| seen.insert(*id));
                if order.len() != entities.len() {
                    return Err(InitializationError::IncompleteOrder {
                        expected: entities.len(),
                        found: order.len(),
                    });
                }
            }
        }
        Ok(order)
    }
}

/// Complete parameter set for a game's initial state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSetup {
    pub entities: Vec<EntitySpec>,
    pub locations: Vec<LocationSpec>,
    pub turn_order: TurnOrder,
    pub max_rounds: Option<u32>,
}

impl GameSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, name: impl Into<EntityName>, tokens: u32) -> Self {
        self.entities.push(EntitySpec::new(name, tokens));
        self
    }

    pub fn with_location(mut self, id: impl Into<LocationId>, slots: usize, revenue: u32) -> Self {
        self.locations.push(LocationSpec::new(id, slots, revenue));
        self
    }

    pub fn with_turn_order(mut self, turn_order: TurnOrder) -> Self {
        self.turn_order = turn_order;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = Some(max_rounds);
        self
    }
}

impl GameState {
    /// Builds the initial state (log position 0) described by `setup`.
    pub fn from_setup(setup: &GameSetup) -> Result<Self, InitializationError> {
        if setup.entities.is_empty() {
            return Err(InitializationError::EmptyRoster);
        }

        let mut entities = EntitiesState::empty();
        for spec in &setup.entities {
            if entities.by_name(&spec.name).is_some() {
                return Err(InitializationError::DuplicateEntity(spec.name.clone()));
            }
            entities.push(spec.name.clone(), spec.tokens);
        }

        let mut board = BoardState::default();
        for spec in &setup.locations {
            if spec.slots == 0 {
                return Err(InitializationError::NoSlots(spec.id.clone()));
            }
            let location = LocationState::new(spec.id.clone(), spec.slots, spec.revenue);
            if board.insert(location).is_some() {
                return Err(InitializationError::DuplicateLocation(spec.id.clone()));
            }
        }

        let order = setup.turn_order.resolve(&entities)?;
        let turn = TurnState::new(order, setup.max_rounds);

        Ok(GameState::new(entities, board, turn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> GameSetup {
        GameSetup::new()
            .with_entity("PRR", 2)
            .with_entity("NYC", 2)
            .with_entity("Erie", 2)
            .with_entity("B&O", 2)
            .with_location("E5", 2, 20)
    }

    fn order_names(state: &GameState) -> Vec<&str> {
        state
            .turn
            .order
            .iter()
            .map(|id| state.entities.get(*id).unwrap().name.as_str())
            .collect()
    }

    #[test]
    fn listed_order_follows_declaration() {
        let state = GameState::from_setup(&roster()).unwrap();
        assert_eq!(order_names(&state), ["PRR", "NYC", "Erie", "B&O"]);
        assert_eq!(state.turn.turn, 1);
        assert_eq!(state.turn.round, 1);
        assert_eq!(state.applied, 0);
    }

    #[test]
    fn seeded_order_is_reproducible() {
        let setup = roster().with_turn_order(TurnOrder::Seeded(1));
        let a = GameState::from_setup(&setup).unwrap();
        let b = GameState::from_setup(&setup).unwrap();
        assert_eq!(a, b);

        let mut names = order_names(&a);
        names.sort_unstable();
        assert_eq!(names, ["B&O", "Erie", "NYC", "PRR"]);
    }

    #[test]
    fn explicit_order_must_be_a_permutation() {
        let setup = roster().with_turn_order(TurnOrder::Explicit(vec![
            "Erie".into(),
            "PRR".into(),
            "NYC".into(),
            "B&O".into(),
        ]));
        let state = GameState::from_setup(&setup).unwrap();
        assert_eq!(order_names(&state), ["Erie", "PRR", "NYC", "B&O"]);

        let duplicated = roster().with_turn_order(TurnOrder::Explicit(vec![
            "Erie".into(),
            "Erie".into(),
            "NYC".into(),
            "B&O".into(),
        ]));
        assert_eq!(
            GameState::from_setup(&duplicated),
            Err(InitializationError::IncompleteOrder {
                expected: 4,
                found: 3
            })
        );

        let unknown = roster().with_turn_order(TurnOrder::Explicit(vec![
            "Reading".into(),
            "PRR".into(),
            "NYC".into(),
            "B&O".into(),
        ]));
        assert_eq!(
            GameState::from_setup(&unknown),
            Err(InitializationError::UnknownEntityInOrder("Reading".into()))
        );
    }

    #[test]
    fn rejects_malformed_rosters_and_boards() {
        assert_eq!(
            GameState::from_setup(&GameSetup::new()),
            Err(InitializationError::EmptyRoster)
        );
        assert_eq!(
            GameState::from_setup(&roster().with_entity("PRR", 1)),
            Err(InitializationError::DuplicateEntity("PRR".into()))
        );
        assert_eq!(
            GameState::from_setup(&roster().with_location("E5", 1, 10)),
            Err(InitializationError::DuplicateLocation("E5".into()))
        );
        assert_eq!(
            GameState::from_setup(&roster().with_location("F2", 0, 10)),
            Err(InitializationError::NoSlots("F2".into()))
        );
    }

    #[test]
    fn setup_errors_are_validation_failures() {
        let error = GameState::from_setup(&roster().with_location("F2", 0, 10)).unwrap_err();
        assert_eq!(error.severity(), ErrorSeverity::Validation);
        assert!(error.severity().is_recoverable());
        assert_eq!(error.error_code(), "SETUP_NO_SLOTS");
    }
}
