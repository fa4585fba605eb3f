//! File-based repository implementations.
//!
//! Layout under the repository root:
//! ```text
//! <root>/<game_id>/actions.log                     append-only action log
//! <root>/<game_id>/snapshots/snapshot_<seq>.bin    bincode snapshots
//! ```

mod action;
mod log;
mod snapshot;

pub use action::FileActionRepository;
pub use log::FileLog;
pub use snapshot::FileSnapshotRepository;

use std::path::{Path, PathBuf};

use crate::repository::GameId;

pub(crate) const ACTIONS_FILE: &str = "actions.log";
pub(crate) const SNAPSHOTS_DIR: &str = "snapshots";

pub(crate) fn game_dir(root: &Path, game: &GameId) -> PathBuf {
    root.join(game.as_str())
}
