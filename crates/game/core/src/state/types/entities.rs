use super::{EntityId, EntityName};

/// Mutable per-entity bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityState {
    pub id: EntityId,
    pub name: EntityName,
    /// Tokens still in hand.
    pub tokens_available: u32,
    /// Tokens already on the board.
    pub tokens_placed: u32,
    /// Resigned entities keep their tokens on the board but never act again.
    pub resigned: bool,
}

impl EntityState {
    pub fn new(id: EntityId, name: EntityName, tokens: u32) -> Self {
        Self {
            id,
            name,
            tokens_available: tokens,
            tokens_placed: 0,
            resigned: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.resigned
    }
}

/// Entity table indexed by [`EntityId`].
///
/// Entities are only ever appended during setup, so `EntityId(n)` is always
/// the entity stored at index `n`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitiesState {
    entities: Vec<EntityState>,
}

impl EntitiesState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends a new entity and returns its handle.
    pub(crate) fn push(&mut self, name: EntityName, tokens: u32) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(EntityState::new(id, name, tokens));
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityState> {
        self.entities.get_mut(id.index())
    }

    pub fn by_name(&self, name: &EntityName) -> Option<&EntityState> {
        self.entities.iter().find(|entity| &entity.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityState> {
        self.entities.iter()
    }

    pub fn active_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_active()).count()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
