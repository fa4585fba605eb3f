pub mod board;
pub mod common;
pub mod entities;
pub mod turn;

// Re-export identifier types
pub use common::{EntityId, EntityName, LocationId};

// Re-export entity table
pub use entities::{EntitiesState, EntityState};

// Re-export board types
pub use board::{BoardState, LocationState};

// Re-export turn state
pub use turn::TurnState;
