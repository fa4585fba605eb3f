//! Cloneable façade for one open game.
//!
//! [`GameHandle`] hides channel plumbing. Mutations and log reads go through
//! the game's session worker and are therefore serialized; state reads come
//! straight from a `watch` channel and never wait on the worker.
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use game_core::{Action, GameState, GameStatus, LoggedAction, Snapshot};

use super::errors::{Result, RuntimeError};
use crate::events::GameEvent;
use crate::repository::GameId;
use crate::session::GameSession;
use crate::workers::Command;

/// Client-facing handle to one game.
#[derive(Clone, Debug)]
pub struct GameHandle {
    game_id: GameId,
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<Arc<GameState>>,
    event_tx: broadcast::Sender<GameEvent>,
}

impl GameHandle {
    pub(crate) fn new(
        game_id: GameId,
        command_tx: mpsc::Sender<Command>,
        state_rx: watch::Receiver<Arc<GameState>>,
        event_tx: broadcast::Sender<GameEvent>,
    ) -> Self {
        Self {
            game_id,
            command_tx,
            state_rx,
            event_tx,
        }
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Submit an action. Returns the resulting state once it is persisted.
    pub async fn submit_action(&self, action: Action) -> Result<Arc<GameState>> {
        self.request(|reply| Command::Submit { action, reply })
            .await?
    }

    /// Truncate the log to `to` entries and re-derive the state.
    pub async fn undo(&self, to: i64) -> Result<Arc<GameState>> {
        self.request(|reply| Command::Undo { to, reply }).await?
    }

    /// Log entries with `sequence >= from`, in order.
    pub async fn actions(&self, from: u64) -> Result<Vec<LoggedAction>> {
        self.request(|reply| Command::Actions { from, reply }).await
    }

    /// Export the current state as a snapshot.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(|reply| Command::Export { reply }).await
    }

    /// Replay the whole log and compare it with the live state.
    pub async fn verify(&self) -> Result<()> {
        self.request(|reply| Command::Verify { reply }).await?
    }

    pub(crate) async fn fork(&self, at: u64, game_id: GameId) -> Result<GameSession> {
        self.request(|reply| Command::Fork { at, game_id, reply })
            .await?
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Latest published state. Never blocks on the worker.
    pub fn current_state(&self) -> Arc<GameState> {
        Arc::clone(&self.state_rx.borrow())
    }

    pub fn status(&self) -> GameStatus {
        self.state_rx.borrow().status()
    }

    /// Receiver that resolves whenever a new state is published.
    pub fn watch_state(&self) -> watch::Receiver<Arc<GameState>> {
        self.state_rx.clone()
    }

    /// Subscribe to this game's events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }
}
