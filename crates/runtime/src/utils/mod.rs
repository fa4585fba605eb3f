pub mod hash;

pub use hash::{hash_game_state, short_hash};
