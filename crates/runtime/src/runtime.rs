//! High-level runtime orchestrator.
//!
//! The runtime owns one session worker per open game, wires up its
//! command/state/event channels, and exposes a builder-based API for
//! creating, reopening and forking games.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use game_core::{GameSetup, GameState, Snapshot};

use crate::api::{GameHandle, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::GameEvent;
use crate::repository::{
    ActionRepository, FileActionRepository, FileSnapshotRepository, GameId,
    InMemoryActionRepository, InMemorySnapshotRepository, SnapshotRepository,
};
use crate::session::{GameSession, SessionConfig};
use crate::workers::{Command, SessionWorker};

struct OpenGame {
    handle: GameHandle,
    worker: JoinHandle<()>,
}

/// Multi-game runtime.
///
/// Games are independent: each runs on its own worker task and shares only
/// the repositories, which key everything by [`GameId`].
pub struct Runtime {
    config: RuntimeConfig,
    actions: Arc<dyn ActionRepository>,
    snapshots: Arc<dyn SnapshotRepository>,
    games: RwLock<HashMap<GameId, OpenGame>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create a game from `setup` and persist its initial state.
    pub async fn create_game(&self, game_id: GameId, setup: &GameSetup) -> Result<GameHandle> {
        let mut games = self.games.write().await;
        if games.contains_key(&game_id) || self.snapshots.exists(&game_id)? {
            return Err(RuntimeError::GameAlreadyExists(game_id));
        }

        let initial = GameState::from_setup(setup).map_err(RuntimeError::InitialState)?;
        // Entries left without a snapshot 0 belong to no game.
        self.actions.truncate(&game_id, 0)?;
        self.snapshots
            .save(&game_id, &Snapshot::initial(initial.clone()))?;

        let session = GameSession::new(game_id.clone(), initial, self.session_config());
        info!(
            target: "runtime::session",
            game = %game_id,
            entities = setup.entities.len(),
            locations = setup.locations.len(),
            "created game"
        );
        Ok(self.spawn(&mut games, session))
    }

    /// Reopen a persisted game, or return its handle if it is already open.
    pub async fn open_game(&self, game_id: GameId) -> Result<GameHandle> {
        let mut games = self.games.write().await;
        if let Some(open) = games.get(&game_id) {
            return Ok(open.handle.clone());
        }

        let initial = self
            .snapshots
            .load(&game_id, 0)?
            .ok_or_else(|| RuntimeError::GameNotFound(game_id.clone()))?;
        let entries = self.actions.load(&game_id, 0)?;
        let nearest = self
            .snapshots
            .latest_at_or_before(&game_id, entries.len() as u64)?
            .filter(|snapshot| snapshot.sequence > 0);

        let session = GameSession::restore(
            game_id,
            initial.state,
            entries,
            nearest,
            self.session_config(),
        )?;
        Ok(self.spawn(&mut games, session))
    }

    /// Handle of an open game.
    pub async fn game(&self, game_id: &GameId) -> Option<GameHandle> {
        self.games
            .read()
            .await
            .get(game_id)
            .map(|open| open.handle.clone())
    }

    /// Start a new game from the first `at` actions of an open game.
    ///
    /// The fork is persisted under `new_id` and evolves independently.
    pub async fn fork_game(&self, source: &GameId, at: u64, new_id: GameId) -> Result<GameHandle> {
        let source_handle = self
            .game(source)
            .await
            .ok_or_else(|| RuntimeError::GameNotFound(source.clone()))?;

        let mut games = self.games.write().await;
        if games.contains_key(&new_id) || self.snapshots.exists(&new_id)? {
            return Err(RuntimeError::GameAlreadyExists(new_id));
        }

        let session = source_handle.fork(at, new_id.clone()).await?;
        if let Err(error) = self.persist_fork(&session) {
            self.discard_log(&new_id);
            return Err(error);
        }

        info!(
            target: "runtime::session",
            source = %source,
            game = %new_id,
            at,
            "forked game"
        );
        Ok(self.spawn(&mut games, session))
    }

    /// Stop the game's worker. Outstanding handles start failing with
    /// [`RuntimeError::CommandChannelClosed`].
    pub async fn close_game(&self, game_id: &GameId) -> Result<()> {
        let open = self
            .games
            .write()
            .await
            .remove(game_id)
            .ok_or_else(|| RuntimeError::GameNotFound(game_id.clone()))?;
        Self::stop(open).await
    }

    /// Identifiers of the open games, sorted.
    pub async fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.games.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        let games = self.games.into_inner();
        for (_, open) in games {
            Self::stop(open).await?;
        }
        Ok(())
    }

    async fn stop(open: OpenGame) -> Result<()> {
        let game_id = open.handle.game_id().clone();
        // A closed channel means the worker is already gone.
        let _ = open.handle.shutdown().await;
        open.worker.await.map_err(RuntimeError::WorkerJoin)?;
        info!(target: "runtime::worker", game = %game_id, "closed game");
        Ok(())
    }

    /// Writes the fork's log, then its initial snapshot. The game only
    /// exists once snapshot 0 is stored.
    fn persist_fork(&self, session: &GameSession) -> Result<()> {
        let game_id = session.game_id();
        self.actions.truncate(game_id, 0)?;
        for entry in session.log() {
            self.actions.append(game_id, entry)?;
        }
        self.snapshots
            .save(game_id, &Snapshot::initial(session.initial_state().clone()))?;
        Ok(())
    }

    fn discard_log(&self, game_id: &GameId) {
        if let Err(error) = self.actions.truncate(game_id, 0) {
            warn!(
                target: "runtime::session",
                game = %game_id,
                error = %error,
                "failed to discard partial log"
            );
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig::from(&self.config)
    }

    fn spawn(&self, games: &mut HashMap<GameId, OpenGame>, session: GameSession) -> GameHandle {
        let game_id = session.game_id().clone();
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (event_tx, _event_rx) = broadcast::channel::<GameEvent>(self.config.event_buffer_size);
        let (state_tx, state_rx) = watch::channel(session.current_state());

        let handle = GameHandle::new(game_id.clone(), command_tx, state_rx, event_tx.clone());
        let worker = SessionWorker::new(
            session,
            Arc::clone(&self.actions),
            Arc::clone(&self.snapshots),
            command_rx,
            state_tx,
            event_tx,
        );
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        games.insert(
            game_id,
            OpenGame {
                handle: handle.clone(),
                worker,
            },
        );
        handle
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    actions: Option<Arc<dyn ActionRepository>>,
    snapshots: Option<Arc<dyn SnapshotRepository>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            actions: None,
            snapshots: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn action_repository(mut self, repository: impl ActionRepository + 'static) -> Self {
        self.actions = Some(Arc::new(repository));
        self
    }

    pub fn snapshot_repository(mut self, repository: impl SnapshotRepository + 'static) -> Self {
        self.snapshots = Some(Arc::new(repository));
        self
    }

    /// Persist games under `dir` unless repositories are set explicitly.
    pub fn file_based(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Build the runtime
    ///
    /// Repositories not provided explicitly are file-based when a data
    /// directory is configured and in-memory otherwise.
    pub fn build(self) -> Result<Runtime> {
        let actions: Arc<dyn ActionRepository> = match (self.actions, &self.config.data_dir) {
            (Some(actions), _) => actions,
            (None, Some(dir)) => Arc::new(FileActionRepository::new(dir)?),
            (None, None) => Arc::new(InMemoryActionRepository::new()),
        };
        let snapshots: Arc<dyn SnapshotRepository> = match (self.snapshots, &self.config.data_dir)
        {
            (Some(snapshots), _) => snapshots,
            (None, Some(dir)) => Arc::new(FileSnapshotRepository::new(dir)?),
            (None, None) => Arc::new(InMemorySnapshotRepository::new()),
        };

        info!(
            target: "runtime::session",
            data_dir = ?self.config.data_dir,
            snapshot_interval = self.config.snapshot_interval,
            "runtime ready"
        );

        Ok(Runtime {
            config: self.config,
            actions,
            snapshots,
            games: RwLock::new(HashMap::new()),
        })
    }
}
