//! Session facade.
//!
//! A `Session` is constructed once per process: it detects the desktop
//! session kind, instantiates the matching display provider, enumerates the
//! displays, and exposes every operation external collaborators (CLI, tray)
//! consume. There is no ambient global state; callers hold the session by
//! `Arc` and drop it at shutdown.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::{self, ticker::Ticker};
use crate::error::{Result, WshError};
use crate::provider::command::{expand_template, first_available, run_cmd};
use crate::provider::{self, Display, SessionKind, SharedProvider};
use crate::source::Image;
use crate::store;

/// Default view-command templates tried in order of preference.
const DEFAULT_VIEW_CMDS: &[&str] = &[
    "xdg-open '{{path}}'",
    "feh --scale-down --auto-zoom '{{path}}'",
    "eog '{{path}}'",
    "eom '{{path}}'",
];

/// Process-wide handle over provider, displays, configuration and schedule.
pub struct Session {
    kind: SessionKind,
    provider: SharedProvider,
    config: RwLock<Config>,
    displays: RwLock<Vec<Display>>,
    ticker: Ticker,
}

impl Session {
    /// Construct a session by detecting the active desktop environment.
    ///
    /// Fails fast with [`WshError::UnsupportedSession`] when no supported
    /// session is present, and with [`WshError::DisplayNotFound`] when the
    /// configuration restricts operation to a display that does not exist.
    pub fn new(config: Config) -> Result<Self> {
        let kind = provider::detect();
        debug!(session = %kind, "detected session");
        let provider = provider::provider_for(kind, config.set_command.clone())?;
        Self::with_provider(config, kind, provider)
    }

    /// Construct a session over an explicit provider.
    ///
    /// Used by tests and by callers that have already done detection.
    pub fn with_provider(
        config: Config,
        kind: SessionKind,
        provider: SharedProvider,
    ) -> Result<Self> {
        let mut displays = provider.list_displays()?;

        if let Some(target) = config.display.as_deref() {
            info!(display = %target, "limiting session to configured display");
            let narrowed = find_display(&displays, target).ok_or_else(|| {
                WshError::DisplayNotFound {
                    display: target.to_string(),
                }
            })?;
            displays = vec![narrowed];
        }

        info!(session = %kind, displays = displays.len(), "session ready");

        let ticker = Ticker::new(config.interval_duration());
        Ok(Self {
            kind,
            provider,
            config: RwLock::new(config),
            displays: RwLock::new(displays),
            ticker,
        })
    }

    /// The detected session kind.
    pub const fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Snapshot of the session's target displays.
    pub fn displays(&self) -> Vec<Display> {
        self.displays.read().expect("displays lock poisoned").clone()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Re-query displays from the already-chosen provider.
    ///
    /// Detection is never re-run; a configured display restriction is
    /// re-applied to the fresh list.
    pub fn refresh(&self) -> Result<()> {
        let mut displays = self.provider.list_displays()?;

        let restriction = self.config().display;
        if let Some(target) = restriction.as_deref() {
            let narrowed = find_display(&displays, target).ok_or_else(|| {
                WshError::DisplayNotFound {
                    display: target.to_string(),
                }
            })?;
            displays = vec![narrowed];
        }

        *self.displays.write().expect("displays lock poisoned") = displays;
        Ok(())
    }

    /// Look up a display by reference: digit strings resolve by index,
    /// anything else by name.
    pub fn display(&self, reference: &str) -> Result<Display> {
        let displays = self.displays.read().expect("displays lock poisoned");
        find_display(&displays, reference).ok_or_else(|| WshError::DisplayNotFound {
            display: reference.to_string(),
        })
    }

    /// The engine's schedule ticker.
    pub const fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// Change the rotation interval at runtime. Zero pauses rotation.
    pub fn set_interval(&self, seconds: u64) {
        info!(interval_secs = seconds, "rotation interval changed");
        self.config
            .write()
            .expect("config lock poisoned")
            .interval = seconds;
        self.ticker.set(Duration::from_secs(seconds));
    }

    /// Run one rotation cycle now, over all displays or a single one.
    pub async fn rotate_now(&self, scope: Option<&str>) -> Result<()> {
        let targets = match scope {
            Some(reference) => vec![self.display(reference)?],
            None => self.displays(),
        };

        let cfg = self.config();
        engine::run_cycle(self.provider.clone(), &cfg, &targets).await
    }

    /// The wallpaper currently on a display.
    ///
    /// Composes the persisted CurrentState entry with the provider's native
    /// query; variants without one fall back to the persisted record.
    pub fn current_wallpaper(&self, reference: &str) -> Result<PathBuf> {
        let mut display = self.display(reference)?;

        let cfg = self.config();
        let state = store::read_current(&cfg.current_file)?;
        if let Some(persisted) = state.display(display.key()) {
            display.current = persisted.current.clone();
        }

        self.provider.current_wallpaper(&display)
    }

    /// Open an image in the configured or auto-detected viewer.
    pub fn view(&self, image: &Path) -> Result<()> {
        debug!(image = %image.display(), "viewing image");
        let path = image.display().to_string();

        let cfg = self.config();
        let cmd = if let Some(template) = cfg.view_command.as_deref() {
            expand_template(template, &path, "")
        } else if self.kind == SessionKind::MacOs {
            format!("open -a Preview '{path}'")
        } else {
            first_available(DEFAULT_VIEW_CMDS, &path, "").map_err(|_| WshError::NoCommand {
                purpose: "view image".to_string(),
            })?
        };

        run_cmd(&cmd)?;
        Ok(())
    }

    /// Path of a named list file under the configured lists directory.
    pub fn list_path(&self, name: &str) -> PathBuf {
        self.config().lists_dir.join(format!("{name}.json"))
    }

    /// Names of all stored lists.
    pub fn list_names(&self) -> Result<Vec<String>> {
        store::list_names(&self.config().lists_dir)
    }

    /// Read a named list.
    pub fn read_list(&self, name: &str) -> Result<Vec<Image>> {
        store::read_list(&self.list_path(name))
    }

    /// Append an image file to a named list.
    pub fn add_to_list(&self, name: &str, image: &Path) -> Result<()> {
        let image = Image::from_path(image)?;
        store::append(&self.list_path(name), image)
    }

    /// Blacklist a display's current wallpaper and rotate it away.
    pub async fn blacklist(&self, reference: &str) -> Result<()> {
        let current = self.current_wallpaper(reference)?;
        warn!(image = %current.display(), "blacklisting image");

        let cfg = self.config();
        let image = Image::from_path(&current)?;
        store::append(&cfg.blacklist_file, image)?;

        self.rotate_now(Some(reference)).await
    }
}

/// Resolve a display reference against a display list.
///
/// Digit strings are treated as indexes (the CLI cannot tell otherwise);
/// everything else matches the session-native name.
fn find_display(displays: &[Display], reference: &str) -> Option<Display> {
    if let Ok(index) = reference.parse::<usize>() {
        displays.iter().find(|d| d.index == index).cloned()
    } else {
        displays.iter().find(|d| d.name == reference).cloned()
    }
}
