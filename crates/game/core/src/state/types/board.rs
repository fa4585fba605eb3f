use std::collections::BTreeMap;

use super::{EntityId, LocationId};

/// A board location with a fixed number of token slots.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationState {
    pub id: LocationId,
    /// Points credited to every entity holding a token here when the game ends.
    pub revenue: u32,
    pub slots: Vec<Option<EntityId>>,
}

impl LocationState {
    pub fn new(id: LocationId, slot_count: usize, revenue: u32) -> Self {
        Self {
            id,
            revenue,
            slots: vec![None; slot_count],
        }
    }

    /// Returns the occupant of `slot`, or `None` if the slot is free or out of range.
    pub fn occupant(&self, slot: usize) -> Option<EntityId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn has_token(&self, entity: EntityId) -> bool {
        self.slots.iter().any(|slot| *slot == Some(entity))
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }
}

/// All board locations, ordered by identifier for deterministic iteration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardState {
    locations: BTreeMap<LocationId, LocationState>,
}

impl BoardState {
    pub(crate) fn insert(&mut self, location: LocationState) -> Option<LocationState> {
        self.locations.insert(location.id.clone(), location)
    }

    pub fn location(&self, id: &LocationId) -> Option<&LocationState> {
        self.locations.get(id)
    }

    pub(crate) fn location_mut(&mut self, id: &LocationId) -> Option<&mut LocationState> {
        self.locations.get_mut(id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &LocationState> {
        self.locations.values()
    }

    /// Sum of revenue over every location where `entity` holds a token.
    pub fn revenue_for(&self, entity: EntityId) -> u32 {
        self.locations
            .values()
            .filter(|location| location.has_token(entity))
            .map(|location| location.revenue)
            .sum()
    }
}
