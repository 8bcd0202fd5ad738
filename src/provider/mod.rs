//! Display provider abstraction.
//!
//! A provider maps the three capabilities wallshift needs (list displays,
//! apply a wallpaper, query the current wallpaper) onto a concrete desktop
//! session's native commands. The variant is chosen once, at session
//! construction, from environment signals; a later display refresh re-queries
//! the same variant and never re-runs detection.

pub mod command;
pub mod hyprland;
pub mod macos;
pub mod mock;
pub mod sway;
pub mod wayland;
pub mod xorg;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WshError};
use crate::source::Image;

/// A physical or logical output that can show a wallpaper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    /// Stable handle used to target operations; may be empty for sessions
    /// that only report names.
    #[serde(default)]
    pub id: String,

    /// Position in the provider's enumeration order.
    #[serde(default)]
    pub index: usize,

    /// Session-native identifier (e.g. `eDP-1`, `HDMI-A-1`, or an index).
    pub name: String,

    /// Optional friendly name.
    #[serde(default)]
    pub label: String,

    /// The image last successfully applied to this display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Image>,
}

impl Display {
    /// Identity used for CurrentState upserts: `id`, falling back to `name`
    /// when the session supplies no stable id.
    pub fn key(&self) -> &str {
        if self.id.is_empty() { &self.name } else { &self.id }
    }
}

/// Capability set over a desktop session's wallpaper mechanism.
pub trait DisplayProvider: Send + Sync {
    /// Enumerate the session's displays.
    fn list_displays(&self) -> Result<Vec<Display>>;

    /// Apply the image at `path` to `display`.
    fn apply(&self, path: &Path, display: &Display) -> Result<()>;

    /// Query the wallpaper currently shown on `display`.
    ///
    /// The passed display carries the persisted `current` entry, which
    /// variants without a native query command fall back to.
    fn current_wallpaper(&self, display: &Display) -> Result<PathBuf>;
}

/// Shared handle to a display provider.
pub type SharedProvider = Arc<dyn DisplayProvider>;

/// The detected desktop session kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Unknown,
    X11,
    Wayland,
    Sway,
    Hyprland,
    MacOs,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::X11 => "x11",
            Self::Wayland => "wayland",
            Self::Sway => "sway",
            Self::Hyprland => "hyprland",
            Self::MacOs => "macos",
        };
        f.write_str(name)
    }
}

/// Detect the active session kind from the process environment.
///
/// This is evaluated once at session construction and never re-run
/// implicitly.
pub fn detect() -> SessionKind {
    detect_from(|name| std::env::var(name).ok(), cfg!(target_os = "macos"))
}

/// Detection logic over explicit environment lookups, for testability.
fn detect_from(env: impl Fn(&str) -> Option<String>, is_mac: bool) -> SessionKind {
    let current_desktop = env("XDG_CURRENT_DESKTOP").unwrap_or_default();
    let session_type = env("XDG_SESSION_TYPE").unwrap_or_default();
    let x_authority = env("XAUTHORITY").unwrap_or_default();
    let i3_socket = env("I3SOCK").unwrap_or_default();
    let sway_socket = env("SWAYSOCK").unwrap_or_default();

    if is_mac {
        SessionKind::MacOs
    } else if current_desktop == "Hyprland" {
        SessionKind::Hyprland
    } else if session_type == "wayland" && !sway_socket.is_empty() {
        SessionKind::Sway
    } else if session_type == "wayland" {
        SessionKind::Wayland
    } else if session_type == "x11" || !x_authority.is_empty() || !i3_socket.is_empty() {
        SessionKind::X11
    } else {
        SessionKind::Unknown
    }
}

/// Instantiate the provider for a detected session kind.
///
/// `set_command` is the user's command template override, if any. Kinds
/// without an implementation (generic Wayland compositors, no session at
/// all) fail with [`WshError::UnsupportedSession`].
pub fn provider_for(kind: SessionKind, set_command: Option<String>) -> Result<SharedProvider> {
    match kind {
        SessionKind::Hyprland => Ok(Arc::new(hyprland::Hyprland::new(set_command))),
        SessionKind::Sway => Ok(Arc::new(sway::Sway::new(set_command))),
        SessionKind::X11 => Ok(Arc::new(xorg::Xorg::new(set_command))),
        SessionKind::MacOs => Ok(Arc::new(macos::MacOs::new())),
        SessionKind::Wayland | SessionKind::Unknown => Err(WshError::UnsupportedSession),
    }
}
