//! Shared repository key types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RepositoryError;

/// Identifier of one game instance.
///
/// Used verbatim as a directory name by the file repositories, so it is
/// restricted to `[A-Za-z0-9_-]` and at most 64 characters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameId(String);

impl GameId {
    const MAX_LEN: usize = 64;

    pub fn new(id: impl Into<String>) -> Result<Self, RepositoryError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= Self::MAX_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(id))
        } else {
            Err(RepositoryError::InvalidGameId(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameId {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for GameId {
    type Error = RepositoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_path_safe_identifiers_only() {
        assert!(GameId::new("game-42_b").is_ok());
        assert!(GameId::new("").is_err());
        assert!(GameId::new("../etc").is_err());
        assert!(GameId::new("a b").is_err());
        assert!(GameId::new("x".repeat(65)).is_err());
    }
}
