//! Repository layer for per-game runtime data.
//!
//! Repositories persist what a game session produces:
//! - the append-only action log, keyed by `(GameId, sequence)`
//! - state snapshots, keyed by `(GameId, sequence)`
//!
//! Snapshots are an optimization. The action log plus the snapshot at
//! sequence 0 (the initial state) are the source of truth for a game.

mod error;
mod traits;
mod types;

pub mod file;
pub mod memory;

pub use error::{RepositoryError, Result};
pub use file::{FileActionRepository, FileSnapshotRepository};
pub use memory::{InMemoryActionRepository, InMemorySnapshotRepository};
pub use traits::{ActionRepository, SnapshotRepository};
pub use types::GameId;
