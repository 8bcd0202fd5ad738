//! Shared fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use wsh::config::Config;

/// A config with every path pointed at test-owned directories.
pub fn test_config(walls: &Path, state: &Path) -> Config {
    Config {
        sources: vec![format!("dir://{}", walls.display())],
        lists_dir: state.join("lists"),
        blacklist_file: state.join("blacklist.json"),
        history_file: state.join("history.json"),
        current_file: state.join("current.json"),
        cache_dir: state.join("cache"),
        display: None,
        interval: 0,
        max_retries: 3,
        retry_interval: 0,
        ..Default::default()
    }
}

/// Create distinct image files in `dir`.
pub fn write_walls(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), name).unwrap();
    }
}

/// Write a config file for CLI invocations, all paths under `state`.
pub fn write_config_file(walls: &Path, state: &Path) -> PathBuf {
    let cfg = test_config(walls, state);
    let path = state.join("config.yml");
    cfg.write_to(&path).unwrap();
    path
}
