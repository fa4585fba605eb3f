//! Binding stored actions to a live game instance.
//!
//! Stored actions name entities by their stable [`EntityName`]. Before an
//! action can be validated or applied it is rehydrated against the specific
//! state it will run on, which turns every name into that state's
//! [`EntityId`]. The same stored action can therefore be replayed against any
//! number of independently built states (canonical session, undo scratch
//! copy, forked what-if line).

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, EntityName, GameState};

/// Identity resolution collaborator: maps stable identifiers to live handles
/// within one game instance.
pub trait EntityResolver {
    /// Looks up the live handle for `name`.
    fn resolve(&self, name: &EntityName) -> Option<EntityId>;

    /// Looks up the stable identifier of a live handle.
    fn name_of(&self, id: EntityId) -> Option<&EntityName>;

    /// Like [`EntityResolver::resolve`] but fails with [`RehydrateError::UnknownEntity`].
    fn require(&self, name: &EntityName) -> Result<EntityId, RehydrateError> {
        self.resolve(name)
            .ok_or_else(|| RehydrateError::UnknownEntity { name: name.clone() })
    }

    /// Like [`EntityResolver::name_of`] but fails with [`RehydrateError::UnknownEntityId`].
    fn require_name(&self, id: EntityId) -> Result<EntityName, RehydrateError> {
        self.name_of(id)
            .cloned()
            .ok_or(RehydrateError::UnknownEntityId { id })
    }
}

impl EntityResolver for GameState {
    fn resolve(&self, name: &EntityName) -> Option<EntityId> {
        self.entities.by_name(name).map(|entity| entity.id)
    }

    fn name_of(&self, id: EntityId) -> Option<&EntityName> {
        self.entities.get(id).map(|entity| &entity.name)
    }
}

/// Failure to bind an action to a game instance.
///
/// Never defaulted or skipped: a stored action whose entity cannot be found
/// means the log and the game it is replayed on disagree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RehydrateError {
    #[error("unknown entity '{name}' in target game")]
    UnknownEntity { name: EntityName },

    #[error("entity handle {id} does not exist in target game")]
    UnknownEntityId { id: EntityId },
}

impl GameError for RehydrateError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity { .. } => "UNKNOWN_ENTITY",
            Self::UnknownEntityId { .. } => "UNKNOWN_ENTITY_ID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, BoundAction};
    use crate::setup::GameSetup;

    fn state_with(names: &[&str]) -> GameState {
        let setup = names
            .iter()
            .fold(GameSetup::new().with_location("E5", 2, 10), |setup, name| {
                setup.with_entity(*name, 2)
            });
        GameState::from_setup(&setup).unwrap()
    }

    #[test]
    fn binds_names_to_handles_of_the_target_instance() {
        let canonical = state_with(&["PRR", "Erie"]);
        let reordered = state_with(&["Erie", "PRR"]);
        let stored = Action::place_token("Erie", "E5", 1);

        let bound = stored.rehydrate(&canonical).unwrap();
        assert_eq!(bound.actor(), EntityId(1));

        let rebound = stored.rehydrate(&reordered).unwrap();
        assert_eq!(rebound.actor(), EntityId(0));
    }

    #[test]
    fn unknown_name_is_reported_not_defaulted() {
        let target = state_with(&["PRR", "NYC"]);
        let stored = Action::place_token("Erie", "E5", 0);

        assert_eq!(
            stored.rehydrate(&target),
            Err(RehydrateError::UnknownEntity {
                name: "Erie".into()
            })
        );
    }

    #[test]
    fn bound_actions_convert_back_to_stored_form() {
        let state = state_with(&["PRR", "Erie"]);
        let stored = Action::pass("Erie");
        let bound = stored.rehydrate(&state).unwrap();
        assert_eq!(bound.to_stored(&state), Ok(stored));

        let dangling = BoundAction::from(crate::action::PassAction::new(EntityId(9)));
        assert_eq!(
            dangling.to_stored(&state),
            Err(RehydrateError::UnknownEntityId { id: EntityId(9) })
        );
    }
}
