use crate::action::{ActionTransition, EntityResolver, RehydrateError};
use crate::engine::turns;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, EntityName, GameState, LocationId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaceTokenError {
    #[error("actor {0} not found")]
    ActorNotFound(EntityId),

    #[error("location {0} does not exist")]
    UnknownLocation(LocationId),

    #[error("slot {slot} is out of range for {location} ({slots} slots)")]
    SlotOutOfRange {
        location: LocationId,
        slot: usize,
        slots: usize,
    },

    #[error("slot {slot} of {location} is already taken by {occupant}")]
    SlotOccupied {
        location: LocationId,
        slot: usize,
        occupant: EntityName,
    },

    #[error("{entity} has no tokens left")]
    NoTokensAvailable { entity: EntityName },

    #[error("{entity} already has a token in {location}")]
    AlreadyTokened {
        entity: EntityName,
        location: LocationId,
    },
}

impl GameError for PlaceTokenError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "PLACE_TOKEN_ACTOR_NOT_FOUND",
            Self::UnknownLocation(_) => "PLACE_TOKEN_UNKNOWN_LOCATION",
            Self::SlotOutOfRange { .. } => "PLACE_TOKEN_SLOT_OUT_OF_RANGE",
            Self::SlotOccupied { .. } => "PLACE_TOKEN_SLOT_OCCUPIED",
            Self::NoTokensAvailable { .. } => "PLACE_TOKEN_NO_TOKENS",
            Self::AlreadyTokened { .. } => "PLACE_TOKEN_ALREADY_TOKENED",
        }
    }
}

/// Stored form: place one of `entity`'s tokens in `slot` of `location`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceToken {
    pub entity: EntityName,
    pub location: LocationId,
    pub slot: usize,
}

impl PlaceToken {
    pub fn new(entity: impl Into<EntityName>, location: impl Into<LocationId>, slot: usize) -> Self {
        Self {
            entity: entity.into(),
            location: location.into(),
            slot,
        }
    }

    pub fn rehydrate<R>(&self, target: &R) -> Result<PlaceTokenAction, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(PlaceTokenAction {
            actor: target.require(&self.entity)?,
            location: self.location.clone(),
            slot: self.slot,
        })
    }
}

/// Bound form of [`PlaceToken`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceTokenAction {
    pub actor: EntityId,
    pub location: LocationId,
    pub slot: usize,
}

impl PlaceTokenAction {
    pub fn new(actor: EntityId, location: impl Into<LocationId>, slot: usize) -> Self {
        Self {
            actor,
            location: location.into(),
            slot,
        }
    }

    pub fn to_stored<R>(&self, source: &R) -> Result<PlaceToken, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(PlaceToken {
            entity: source.require_name(self.actor)?,
            location: self.location.clone(),
            slot: self.slot,
        })
    }
}

impl ActionTransition for PlaceTokenAction {
    type Error = PlaceTokenError;

    fn actor(&self) -> EntityId {
        self.actor
    }

    fn validate(&self, state: &GameState) -> Result<(), Self::Error> {
        let actor = state
            .entities
            .get(self.actor)
            .ok_or(PlaceTokenError::ActorNotFound(self.actor))?;

        let location = state
            .board
            .location(&self.location)
            .ok_or_else(|| PlaceTokenError::UnknownLocation(self.location.clone()))?;

        if self.slot >= location.slots.len() {
            return Err(PlaceTokenError::SlotOutOfRange {
                location: self.location.clone(),
                slot: self.slot,
                slots: location.slots.len(),
            });
        }

        if let Some(occupant) = location.occupant(self.slot) {
            let occupant = state
                .entities
                .get(occupant)
                .map(|entity| entity.name.clone())
                .unwrap_or_else(|| EntityName::new(occupant.to_string()));
            return Err(PlaceTokenError::SlotOccupied {
                location: self.location.clone(),
                slot: self.slot,
                occupant,
            });
        }

        if actor.tokens_available == 0 {
            return Err(PlaceTokenError::NoTokensAvailable {
                entity: actor.name.clone(),
            });
        }

        if location.has_token(self.actor) {
            return Err(PlaceTokenError::AlreadyTokened {
                entity: actor.name.clone(),
                location: self.location.clone(),
            });
        }

        Ok(())
    }

    fn apply(&self, state: &mut GameState) {
        if let Some(location) = state.board.location_mut(&self.location)
            && let Some(slot) = location.slots.get_mut(self.slot)
        {
            *slot = Some(self.actor);
        }

        if let Some(actor) = state.entities.get_mut(self.actor) {
            actor.tokens_available = actor.tokens_available.saturating_sub(1);
            actor.tokens_placed += 1;
        }

        state.turn.consecutive_passes = 0;
        turns::end_turn(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::GameSetup;

    fn state() -> GameState {
        let setup = GameSetup::new()
            .with_entity("PRR", 1)
            .with_entity("NYC", 2)
            .with_location("E5", 2, 20)
            .with_location("F6", 1, 10);
        GameState::from_setup(&setup).unwrap()
    }

    #[test]
    fn placing_occupies_the_slot_and_spends_a_token() {
        let mut state = state();
        let action = PlaceTokenAction::new(EntityId(0), "E5", 1);
        action.validate(&state).unwrap();
        action.apply(&mut state);

        let location = state.board.location(&"E5".into()).unwrap();
        assert_eq!(location.occupant(1), Some(EntityId(0)));
        let prr = state.entities.get(EntityId(0)).unwrap();
        assert_eq!(prr.tokens_available, 0);
        assert_eq!(prr.tokens_placed, 1);
        assert_eq!(state.current_actor(), Some(EntityId(1)));
    }

    #[test]
    fn rejects_taken_slots_and_missing_locations() {
        let mut state = state();
        PlaceTokenAction::new(EntityId(0), "E5", 0).apply(&mut state);

        assert_eq!(
            PlaceTokenAction::new(EntityId(1), "E5", 0).validate(&state),
            Err(PlaceTokenError::SlotOccupied {
                location: "E5".into(),
                slot: 0,
                occupant: "PRR".into(),
            })
        );
        assert_eq!(
            PlaceTokenAction::new(EntityId(1), "Z9", 0).validate(&state),
            Err(PlaceTokenError::UnknownLocation("Z9".into()))
        );
        assert_eq!(
            PlaceTokenAction::new(EntityId(1), "F6", 3).validate(&state),
            Err(PlaceTokenError::SlotOutOfRange {
                location: "F6".into(),
                slot: 3,
                slots: 1,
            })
        );
    }

    #[test]
    fn one_token_per_location_and_none_without_stock() {
        let mut state = state();
        PlaceTokenAction::new(EntityId(0), "E5", 0).apply(&mut state);
        PlaceTokenAction::new(EntityId(1), "F6", 0).apply(&mut state);

        assert_eq!(
            PlaceTokenAction::new(EntityId(0), "E5", 1).validate(&state),
            Err(PlaceTokenError::NoTokensAvailable {
                entity: "PRR".into()
            })
        );

        let mut state = self::state();
        PlaceTokenAction::new(EntityId(1), "E5", 0).apply(&mut state);
        assert_eq!(
            PlaceTokenAction::new(EntityId(1), "E5", 1).validate(&state),
            Err(PlaceTokenError::AlreadyTokened {
                entity: "NYC".into(),
                location: "E5".into(),
            })
        );
    }
}
