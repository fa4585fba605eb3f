use crate::action::{ActionTransition, EntityResolver, RehydrateError};
use crate::engine::turns;
use crate::error::NeverError;
use crate::state::{EntityId, EntityName, GameState};

/// Stored form: `entity` leaves the game. Its placed tokens stay on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resign {
    pub entity: EntityName,
}

impl Resign {
    pub fn new(entity: impl Into<EntityName>) -> Self {
        Self {
            entity: entity.into(),
        }
    }

    pub fn rehydrate<R>(&self, target: &R) -> Result<ResignAction, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(ResignAction::new(target.require(&self.entity)?))
    }
}

/// Bound form of [`Resign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResignAction {
    pub actor: EntityId,
}

impl ResignAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }

    pub fn to_stored<R>(&self, source: &R) -> Result<Resign, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(Resign {
            entity: source.require_name(self.actor)?,
        })
    }
}

impl ActionTransition for ResignAction {
    type Error = NeverError;

    fn actor(&self) -> EntityId {
        self.actor
    }

    fn apply(&self, state: &mut GameState) {
        if let Some(actor) = state.entities.get_mut(self.actor) {
            actor.resigned = true;
        }
        state.turn.consecutive_passes = 0;

        if state.entities.active_count() <= 1 {
            turns::finish(state);
        } else {
            turns::end_turn(state);
        }
    }
}
