//! Turn hand-over and game completion.

use crate::state::{GameResult, GameState};

/// Hands the turn to the next non-resigned entity in seating order.
///
/// Starting a round past `max_rounds`, or finding nobody left to act, ends
/// the game instead.
pub(crate) fn end_turn(state: &mut GameState) {
    let Some((position, wrapped)) = state.turn.next_position(&state.entities) else {
        finish(state);
        return;
    };

    let round = if wrapped {
        state.turn.round + 1
    } else {
        state.turn.round
    };
    if state.turn.max_rounds.is_some_and(|max| round > max) {
        finish(state);
        return;
    }

    state.turn.position = position;
    state.turn.turn += 1;
    state.turn.round = round;
}

/// Records the final result. Every entity, resigned or not, is scored by the
/// revenue of the locations holding its tokens.
pub(crate) fn finish(state: &mut GameState) {
    let scores = state
        .entities
        .iter()
        .map(|entity| (entity.name.clone(), state.board.revenue_for(entity.id)))
        .collect();
    state.result = Some(GameResult { scores });
}
