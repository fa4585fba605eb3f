//! Runtime configuration and environment loading.
use std::env;
use std::path::PathBuf;

/// Configuration shared by the runtime and every session worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Actions between session snapshots (0 disables periodic snapshots).
    pub snapshot_interval: u64,
    /// Capacity of each game's command queue.
    pub command_buffer_size: usize,
    /// Capacity of each game's event broadcast channel.
    pub event_buffer_size: usize,
    /// Root directory for file-backed repositories.
    pub data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 10,
            command_buffer_size: 32,
            event_buffer_size: 100,
            data_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SNAPSHOT_INTERVAL` - Actions between snapshots (default: 10)
    /// - `COMMAND_BUFFER` - Per-game command queue size (default: 32)
    /// - `EVENT_BUFFER` - Per-game event channel size (default: 100)
    /// - `SAVE_DATA_DIR` - Directory for file-backed repositories (default: none)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(interval) = read_env::<u64>("SNAPSHOT_INTERVAL") {
            config.snapshot_interval = interval;
        }
        if let Some(capacity) = read_env::<usize>("COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        config.data_dir = env::var("SAVE_DATA_DIR").ok().map(PathBuf::from);

        config
    }

    pub fn with_snapshot_interval(mut self, interval: u64) -> Self {
        self.snapshot_interval = interval;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
