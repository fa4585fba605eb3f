//! Platform-specific directory utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use runtime::RuntimeConfig;

/// Get the data directory holding persisted games
///
/// `SAVE_DATA_DIR` wins when set. Otherwise follows platform conventions:
/// - macOS: `~/Library/Application Support/tokenline`
/// - Linux: `~/.local/share/tokenline` (or `$XDG_DATA_HOME/tokenline`)
/// - Windows: `%APPDATA%\tokenline`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    if let Some(dir) = RuntimeConfig::from_env().data_dir {
        return dir;
    }

    directories::ProjectDirs::from("", "", "tokenline")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

/// Most recently modified game directory under `data_dir`
pub fn find_latest_game(data_dir: &Path) -> Result<String> {
    let mut games = Vec::new();

    for entry in std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read data directory: {}", data_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir()
            && let Some(name) = path.file_name().and_then(|n| n.to_str())
        {
            let modified = entry.metadata()?.modified()?;
            games.push((name.to_string(), modified));
        }
    }

    // Newest first
    games.sort_by(|a, b| b.1.cmp(&a.1));

    games
        .into_iter()
        .next()
        .map(|(name, _)| name)
        .with_context(|| format!("No games found in {}", data_dir.display()))
}
