//! Action registry - the closed set of player actions.
//!
//! Every kind exists in two forms:
//! - a **stored** form (`PlaceToken`, `Pass`, `Resign`) that names entities by
//!   [`EntityName`] and is what the action log records;
//! - a **bound** form (`PlaceTokenAction`, ...) produced by
//!   [`Action::rehydrate`] against one live state, carrying [`EntityId`]
//!   handles and implementing [`ActionTransition`].
//!
//! Dispatch over kinds is an exhaustive `match`; there is no dynamic lookup.

pub mod kind;
pub mod kinds;
pub mod rehydrate;

pub use kind::ActionKind;
pub use kinds::{
    Pass, PassAction, PlaceToken, PlaceTokenAction, PlaceTokenError, Resign, ResignAction,
};
pub use rehydrate::{EntityResolver, RehydrateError};

use crate::state::{EntityId, EntityName, GameState, LocationId};

/// Defines how a bound action variant checks and mutates game state.
///
/// `validate` must be side-effect free. `apply` is only ever called after
/// `validate` succeeded on the same state and must not fail for such input;
/// it is where turn advancement and game completion happen.
pub trait ActionTransition {
    type Error;

    /// Returns the entity performing this action.
    fn actor(&self) -> EntityId;

    /// Checks kind-specific legality against the state **before** mutation.
    fn validate(&self, _state: &GameState) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies the action by mutating the game state directly.
    fn apply(&self, state: &mut GameState);
}

/// Stored action: immutable, serializable, free of live references.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    PlaceToken(PlaceToken),
    Pass(Pass),
    Resign(Resign),
}

impl Action {
    pub fn place_token(
        entity: impl Into<EntityName>,
        location: impl Into<LocationId>,
        slot: usize,
    ) -> Self {
        Self::PlaceToken(PlaceToken::new(entity, location, slot))
    }

    pub fn pass(entity: impl Into<EntityName>) -> Self {
        Self::Pass(Pass::new(entity))
    }

    pub fn resign(entity: impl Into<EntityName>) -> Self {
        Self::Resign(Resign::new(entity))
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PlaceToken(_) => ActionKind::PlaceToken,
            Action::Pass(_) => ActionKind::Pass,
            Action::Resign(_) => ActionKind::Resign,
        }
    }

    /// Stable identifier of the acting entity.
    pub fn entity(&self) -> &EntityName {
        match self {
            Action::PlaceToken(action) => &action.entity,
            Action::Pass(action) => &action.entity,
            Action::Resign(action) => &action.entity,
        }
    }

    /// Binds this action to the entity handles of `target`.
    pub fn rehydrate<R>(&self, target: &R) -> Result<BoundAction, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(match self {
            Action::PlaceToken(action) => BoundAction::PlaceToken(action.rehydrate(target)?),
            Action::Pass(action) => BoundAction::Pass(action.rehydrate(target)?),
            Action::Resign(action) => BoundAction::Resign(action.rehydrate(target)?),
        })
    }
}

/// Action bound to one live game instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundAction {
    PlaceToken(PlaceTokenAction),
    Pass(PassAction),
    Resign(ResignAction),
}

impl BoundAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            BoundAction::PlaceToken(_) => ActionKind::PlaceToken,
            BoundAction::Pass(_) => ActionKind::Pass,
            BoundAction::Resign(_) => ActionKind::Resign,
        }
    }

    pub fn actor(&self) -> EntityId {
        match self {
            BoundAction::PlaceToken(action) => action.actor(),
            BoundAction::Pass(action) => action.actor(),
            BoundAction::Resign(action) => action.actor(),
        }
    }

    /// Converts back to the stored, identifier-based form.
    pub fn to_stored<R>(&self, source: &R) -> Result<Action, RehydrateError>
    where
        R: EntityResolver + ?Sized,
    {
        Ok(match self {
            BoundAction::PlaceToken(action) => Action::PlaceToken(action.to_stored(source)?),
            BoundAction::Pass(action) => Action::Pass(action.to_stored(source)?),
            BoundAction::Resign(action) => Action::Resign(action.to_stored(source)?),
        })
    }
}

impl From<PlaceToken> for Action {
    fn from(action: PlaceToken) -> Self {
        Self::PlaceToken(action)
    }
}

impl From<Pass> for Action {
    fn from(action: Pass) -> Self {
        Self::Pass(action)
    }
}

impl From<Resign> for Action {
    fn from(action: Resign) -> Self {
        Self::Resign(action)
    }
}

impl From<PlaceTokenAction> for BoundAction {
    fn from(action: PlaceTokenAction) -> Self {
        Self::PlaceToken(action)
    }
}

impl From<PassAction> for BoundAction {
    fn from(action: PassAction) -> Self {
        Self::Pass(action)
    }
}

impl From<ResignAction> for BoundAction {
    fn from(action: ResignAction) -> Self {
        Self::Resign(action)
    }
}
