//! Action validation and execution pipeline.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! bound action passes the same checks before its kind-specific transition
//! runs:
//!
//! 1. the game is not finished,
//! 2. the actor exists and has not resigned,
//! 3. the actor is the entity currently acting.
//!
//! Execution is all-or-nothing: a rejected action leaves the state untouched.

mod errors;
pub mod replay;
mod transition;
pub(crate) mod turns;

pub use errors::ExecuteError;
pub use replay::{ReplayError, Replayer, Snapshot, replay, replay_from};

use crate::action::BoundAction;
use crate::state::GameState;

/// Game engine that validates and applies bound actions to one state.
pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    /// Runs every check [`GameEngine::execute`] would run, without mutating.
    pub fn validate(&self, action: &BoundAction) -> Result<(), ExecuteError> {
        validate(self.state, action)
    }

    /// Validates and applies `action`, advancing the applied-action count.
    pub fn execute(&mut self, action: &BoundAction) -> Result<(), ExecuteError> {
        validate(self.state, action)?;
        transition::apply_transition(action, self.state);
        self.state.applied += 1;
        Ok(())
    }
}

/// Checks whether `action` may be applied to `state`.
pub fn validate(state: &GameState, action: &BoundAction) -> Result<(), ExecuteError> {
    if state.is_finished() {
        return Err(ExecuteError::GameFinished);
    }

    let actor = action.actor();
    let entity = state
        .entities
        .get(actor)
        .ok_or(ExecuteError::UnknownActor(actor))?;
    if entity.resigned {
        return Err(ExecuteError::ActorResigned(entity.name.clone()));
    }

    let current = state.current_actor();
    if current != Some(actor) {
        let acting = current
            .and_then(|id| state.entities.get(id))
            .map(|entity| entity.name.clone())
            .ok_or(ExecuteError::GameFinished)?;
        return Err(ExecuteError::ActorNotActing {
            actor: entity.name.clone(),
            acting,
        });
    }

    transition::validate_transition(action, state)
}

/// Pure apply: returns the successor of `state`, leaving `state` untouched.
pub fn apply(state: &GameState, action: &BoundAction) -> Result<GameState, ExecuteError> {
    let mut next = state.clone();
    GameEngine::new(&mut next).execute(action)?;
    Ok(next)
}
