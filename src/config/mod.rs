//! Configuration file handling.
//!
//! The config file is YAML, created with defaults on first run, and lives at
//! `~/.config/wallshift/config.yml`. CLI flags are merged over the file values
//! with the flags taking precedence.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WshError};

/// Upper bound on the rotation interval, in seconds (one year).
pub const MAX_INTERVAL: u64 = 31_536_000;
/// Lower bound on a non-zero rotation interval, in seconds.
pub const MIN_INTERVAL: u64 = 10;

/// Runtime configuration.
///
/// An `interval` of zero means rotation is paused; the engine keeps its
/// schedule armed but idle until the interval becomes non-zero again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Image source descriptors: a bare path, `dir://`, `list://` or `ssh://`.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Directory holding named list files.
    #[serde(default = "default_lists_dir")]
    pub lists_dir: PathBuf,

    /// Blacklist file path.
    #[serde(rename = "blacklist", default = "default_blacklist_file")]
    pub blacklist_file: PathBuf,

    /// History file path.
    #[serde(rename = "history", default = "default_history_file")]
    pub history_file: PathBuf,

    /// CurrentState file path.
    #[serde(rename = "current", default = "default_current_file")]
    pub current_file: PathBuf,

    /// Maximum number of history entries to retain.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Staging directory for images fetched from remote sources.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Maximum number of files to keep in the staging directory.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Custom wallpaper-set command template with `{{path}}` and
    /// `{{display}}` placeholders. Overrides the session defaults.
    #[serde(default)]
    pub set_command: Option<String>,

    /// Custom image-viewer command template with a `{{path}}` placeholder.
    #[serde(default)]
    pub view_command: Option<String>,

    /// Restrict operations to a single display (index or name).
    #[serde(default)]
    pub display: Option<String>,

    /// Rotation interval in seconds. Zero pauses automatic rotation.
    #[serde(default)]
    pub interval: u64,

    /// Skip the history filter when building the candidate pool.
    #[serde(default)]
    pub ignore_history: bool,

    /// Skip writing current/history state after an apply.
    #[serde(default)]
    pub no_track: bool,

    /// Maximum apply attempts per display within one cycle.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff between apply attempts, in seconds.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            lists_dir: default_lists_dir(),
            blacklist_file: default_blacklist_file(),
            history_file: default_history_file(),
            current_file: default_current_file(),
            history_size: default_history_size(),
            cache_dir: default_cache_dir(),
            cache_size: default_cache_size(),
            set_command: None,
            view_command: None,
            display: None,
            interval: 0,
            ignore_history: false,
            no_track: false,
            max_retries: default_max_retries(),
            retry_interval: default_retry_interval(),
        }
    }
}

fn config_home() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wallshift")
}

fn data_home() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wallshift")
}

fn default_sources() -> Vec<String> {
    let pictures = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Pictures/Wallpapers");
    vec![format!("dir://{}", pictures.display())]
}

fn default_lists_dir() -> PathBuf {
    data_home().join("lists")
}

fn default_blacklist_file() -> PathBuf {
    config_home().join("blacklist.json")
}

fn default_history_file() -> PathBuf {
    data_home().join("history.json")
}

fn default_current_file() -> PathBuf {
    data_home().join("current.json")
}

fn default_history_size() -> usize {
    50
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wallshift")
}

fn default_cache_size() -> usize {
    50
}

fn default_max_retries() -> u32 {
    6
}

fn default_retry_interval() -> u64 {
    1
}

/// CLI overrides merged over the file configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sources: Vec<String>,
    pub display: Option<String>,
    pub interval: Option<u64>,
    pub ignore_history: bool,
    pub no_track: bool,
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        config_home().join("config.yml")
    }

    /// Load the configuration from `path`, or from the default location.
    ///
    /// A missing file is created with defaults rather than treated as an
    /// error. The state/cache directories named by the config are created.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);

        if !path.exists() {
            warn!(path = %path.display(), "creating new config file");
            let cfg = Self::default();
            cfg.write_to(&path)?;
            cfg.create_dirs()?;
            return Ok(cfg);
        }

        let data = fs::read_to_string(&path)?;
        let cfg: Self = serde_yaml::from_str(&data)
            .map_err(|e| WshError::ConfigParse(format!("{}: {e}", path.display())))?;

        cfg.validate()?;
        cfg.create_dirs()?;

        debug!(path = %path.display(), sources = cfg.sources.len(), "loaded config");
        Ok(cfg)
    }

    /// Serialize the configuration to `path` as YAML.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_yaml::to_string(self)
            .map_err(|e| WshError::ConfigParse(e.to_string()))?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Merge CLI overrides over this configuration, flags taking precedence.
    pub fn merge(mut self, overrides: Overrides) -> Self {
        if !overrides.sources.is_empty() {
            self.sources = overrides.sources;
        }
        if overrides.display.is_some() {
            self.display = overrides.display;
        }
        if let Some(interval) = overrides.interval {
            self.interval = interval;
        }
        self.ignore_history = self.ignore_history || overrides.ignore_history;
        self.no_track = self.no_track || overrides.no_track;
        self
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.interval != 0 && !(MIN_INTERVAL..=MAX_INTERVAL).contains(&self.interval) {
            return Err(WshError::ConfigInvalid(format!(
                "interval must be 0 or between {MIN_INTERVAL} and {MAX_INTERVAL} seconds"
            )));
        }
        if self.max_retries == 0 {
            return Err(WshError::ConfigInvalid(
                "max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Create the directories the configuration points at.
    fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.lists_dir)?;
        fs::create_dir_all(&self.cache_dir)?;
        for file in [&self.blacklist_file, &self.history_file, &self.current_file] {
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Rotation interval as a `Duration`. Zero means paused.
    pub const fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Backoff between apply attempts as a `Duration`.
    pub const fn retry_interval_duration(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }
}
