use crate::action::{ActionTransition, EntityResolver, RehydrateError};
use crate::engine::turns;
use crate::error::NeverError;
use crate::state::{EntityId, EntityName, GameState};

/// Stored form: `entity` gives up its turn without placing a token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pass {
    pub entity: EntityName,
}

impl Pass {
    pub fn new(entity: impl Into<EntityName>) -> Self {
        Self {
            entity: entity.into(),
        }
    }

    pub fn rehydrate<R>(&self, target: &R) -> Result<PassAction, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(PassAction::new(target.require(&self.entity)?))
    }
}

/// Bound form of [`Pass`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassAction {
    pub actor: EntityId,
}

impl PassAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }

    pub fn to_stored<R>(&self, source: &R) -> Result<Pass, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(Pass {
            entity: source.require_name(self.actor)?,
        })
    }
}

impl ActionTransition for PassAction {
    type Error = NeverError;

    fn actor(&self) -> EntityId {
        self.actor
    }

    /// Ends the game once every active entity has passed in a row.
    fn apply(&self, state: &mut GameState) {
        state.turn.consecutive_passes += 1;
        if state.turn.consecutive_passes as usize >= state.entities.active_count() {
            turns::finish(state);
        } else {
            turns::end_turn(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::GameSetup;

    #[test]
    fn a_full_round_of_passes_finishes_the_game() {
        let setup = GameSetup::new()
            .with_entity("PRR", 1)
            .with_entity("NYC", 1)
            .with_location("E5", 1, 20);
        let mut state = GameState::from_setup(&setup).unwrap();

        PassAction::new(EntityId(0)).apply(&mut state);
        assert!(!state.is_finished());
        assert_eq!(state.current_actor(), Some(EntityId(1)));

        PassAction::new(EntityId(1)).apply(&mut state);
        assert!(state.is_finished());
        assert_eq!(state.current_actor(), None);
    }
}
