//! Hashing utilities for game state.
//!
//! Provides a deterministic fingerprint of a state for events, logging and
//! divergence checks.

use game_core::GameState;
use sha2::{Digest, Sha256};

/// SHA-256 over the bincode encoding of `state`, hex encoded.
///
/// Two states hash equal exactly when their encodings are equal, which for
/// [`GameState`] means they are equal.
pub fn hash_game_state(state: &GameState) -> Result<String, bincode::Error> {
    let bytes = bincode::serialize(state)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Short form of a state hash for log lines.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use game_core::{Action, GameSetup, engine};

    use super::*;

    fn state() -> GameState {
        let setup = GameSetup::new()
            .with_entity("PRR", 1)
            .with_entity("NYC", 1)
            .with_location("E5", 1, 10);
        GameState::from_setup(&setup).unwrap()
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        let state = state();
        let hash = hash_game_state(&state).unwrap();
        assert_eq!(hash, hash_game_state(&state.clone()).unwrap());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        let bound = Action::pass("PRR").rehydrate(&state).unwrap();
        let next = engine::apply(&state, &bound).unwrap();
        assert_ne!(hash, hash_game_state(&next).unwrap());
        assert_eq!(short_hash(&hash).len(), 16);
    }
}
