//! Runtime orchestration for action-replay games.
//!
//! This crate wraps the deterministic `game-core` rules in game sessions,
//! serializes every mutation of a game through a dedicated worker task,
//! persists action logs and snapshots, and exposes the result through a
//! cloneable [`GameHandle`].
//!
//! Modules are organized by responsibility:
//! - [`session`] is the synchronous single-game core
//! - [`runtime`] hosts the multi-game orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`repository`] provides in-memory and file-backed persistence
//! - [`events`], [`metadata`] and [`utils`] are supporting adapters
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod metadata;
pub mod repository;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod utils;

mod workers;

pub use api::{
    DataIntegrityError, GameHandle, Result, RuntimeError, SessionError, ValidationError,
};
pub use config::RuntimeConfig;
pub use events::GameEvent;
pub use metadata::{GameMetadata, GameSettings, GameSummary, PlayerInfo};
pub use repository::{
    ActionRepository, FileActionRepository, FileSnapshotRepository, GameId,
    InMemoryActionRepository, InMemorySnapshotRepository, RepositoryError, SnapshotRepository,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use session::{GameSession, PreparedAction, SessionConfig};
pub use snapshot::SnapshotCache;
pub use utils::hash_game_state;
