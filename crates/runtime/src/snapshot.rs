//! In-session snapshot cache.
//!
//! A snapshot at sequence 0 (the initial state) is always present, so every
//! log position has a nearest snapshot at or before it.

use std::collections::BTreeMap;
use std::sync::Arc;

use game_core::{GameState, Snapshot};

#[derive(Clone, Debug)]
pub struct SnapshotCache {
    interval: u64,
    snapshots: BTreeMap<u64, Arc<GameState>>,
}

impl SnapshotCache {
    /// Creates a cache seeded with the initial state. An `interval` of 0
    /// disables periodic snapshots.
    pub fn new(initial: Arc<GameState>, interval: u64) -> Self {
        let mut snapshots = BTreeMap::new();
        snapshots.insert(0, initial);
        Self {
            interval,
            snapshots,
        }
    }

    /// Returns true if a snapshot should be taken once the log reaches `len`.
    pub fn should_snapshot(&self, len: u64) -> bool {
        self.interval > 0 && len > 0 && len % self.interval == 0
    }

    pub fn insert(&mut self, sequence: u64, state: Arc<GameState>) {
        self.snapshots.insert(sequence, state);
    }

    /// Snapshot with the greatest sequence `<= sequence`.
    pub fn nearest_at_or_before(&self, sequence: u64) -> Option<Snapshot> {
        self.snapshots
            .range(..=sequence)
            .next_back()
            .map(|(sequence, state)| Snapshot {
                sequence: *sequence,
                state: GameState::clone(state),
            })
    }

    /// Drops every snapshot past `sequence`. The initial snapshot is kept.
    pub fn discard_after(&mut self, sequence: u64) {
        self.snapshots.split_off(&sequence.saturating_add(1));
    }

    pub fn sequences(&self) -> impl Iterator<Item = u64> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }
}
