//! In-memory repository implementations for tests and ephemeral runtimes.

mod action;
mod snapshot;

pub use action::InMemoryActionRepository;
pub use snapshot::InMemorySnapshotRepository;
