//! Deterministic game rules shared by the runtime and offline tools.
//!
//! `game-core` defines the canonical state, the closed set of actions, the
//! engine that validates and applies them, and the replay machinery that
//! re-derives state from an action log. Everything here is synchronous and
//! side-effect free: the same initial state and the same log always yield
//! the same state. All state mutation flows through [`engine::GameEngine`].
pub mod action;
pub mod engine;
pub mod error;
pub mod log;
pub mod setup;
pub mod state;

pub use action::{
    Action, ActionKind, ActionTransition, BoundAction, EntityResolver, Pass, PassAction,
    PlaceToken, PlaceTokenAction, PlaceTokenError, RehydrateError, Resign, ResignAction,
};
pub use engine::{
    ExecuteError, GameEngine, ReplayError, Replayer, Snapshot, replay, replay_from,
};
pub use error::{ErrorSeverity, GameError, NeverError};
pub use log::{ActionLog, LogError, LoggedAction};
pub use setup::{EntitySpec, GameSetup, InitializationError, LocationSpec, TurnOrder};
pub use state::{
    BoardState, EntitiesState, EntityId, EntityName, EntityState, GameResult, GameState,
    GameStatus, LocationId, LocationState, TurnState,
};
