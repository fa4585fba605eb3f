use super::{EntitiesState, EntityId};

/// Turn bookkeeping for a fixed seating order.
///
/// `turn` counts every hand-over of the turn and `round` counts full passes
/// through the order. Both start at 1. Turn order itself is fixed at setup and
/// never changes during replay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Seating order resolved at setup.
    pub order: Vec<EntityId>,

    /// Index into `order` of the entity whose turn it is.
    pub position: usize,

    pub turn: u32,
    pub round: u32,

    /// Passes in a row since the last token placement or resignation.
    pub consecutive_passes: u32,

    /// Game ends instead of starting round `max_rounds + 1`.
    pub max_rounds: Option<u32>,
}

impl TurnState {
    pub fn new(order: Vec<EntityId>, max_rounds: Option<u32>) -> Self {
        Self {
            order,
            position: 0,
            turn: 1,
            round: 1,
            consecutive_passes: 0,
            max_rounds,
        }
    }

    /// Entity seated at the current position.
    pub fn current(&self) -> Option<EntityId> {
        self.order.get(self.position).copied()
    }

    /// Finds the next seat held by a non-resigned entity.
    ///
    /// Returns the new position and whether the search wrapped past the end of
    /// the order (i.e. a new round begins). Returns `None` when nobody can act.
    pub fn next_position(&self, entities: &EntitiesState) -> Option<(usize, bool)> {
        let seats = self.order.len();
        (1..=seats).find_map(|step| {
            let raw = self.position + step;
            let index = raw % seats;
            let active = entities
                .get(self.order[index])
                .is_some_and(|entity| entity.is_active());
            active.then_some((index, raw >= seats))
        })
    }
}
