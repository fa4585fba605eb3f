//! Error types raised by repository implementations.

use thiserror::Error;

use super::GameId;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("out-of-order append for game {game}: expected sequence {expected}, found {found}")]
    OutOfOrder {
        game: GameId,
        expected: u64,
        found: u64,
    },

    #[error("invalid game id '{0}': use 1-64 characters from [A-Za-z0-9_-]")]
    InvalidGameId(String),
}

impl From<bincode::Error> for RepositoryError {
    fn from(error: bincode::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
