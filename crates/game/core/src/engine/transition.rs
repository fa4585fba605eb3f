//! Action transition dispatch.

use crate::action::{ActionTransition, BoundAction};
use crate::state::GameState;

use super::errors::ExecuteError;

#[inline]
fn check_transition<T>(transition: &T, state: &GameState) -> Result<(), T::Error>
where
    T: ActionTransition,
{
    transition.validate(state)
}

/// Routes a bound action to its kind-specific validation.
pub(super) fn validate_transition(
    action: &BoundAction,
    state: &GameState,
) -> Result<(), ExecuteError> {
    match action {
        BoundAction::PlaceToken(transition) => {
            check_transition(transition, state).map_err(ExecuteError::PlaceToken)
        }
        BoundAction::Pass(transition) => {
            check_transition(transition, state).map_err(|never| match never {})
        }
        BoundAction::Resign(transition) => {
            check_transition(transition, state).map_err(|never| match never {})
        }
    }
}

/// Routes a bound action to its kind-specific mutation.
///
/// Must only be called after [`validate_transition`] succeeded on `state`.
pub(super) fn apply_transition(action: &BoundAction, state: &mut GameState) {
    match action {
        BoundAction::PlaceToken(transition) => transition.apply(state),
        BoundAction::Pass(transition) => transition.apply(state),
        BoundAction::Resign(transition) => transition.apply(state),
    }
}
