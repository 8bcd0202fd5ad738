//! Error types for wallpaper rotation operations.

use thiserror::Error;

/// Primary error type for wallshift operations.
#[derive(Error, Debug)]
pub enum WshError {
    // Session errors
    #[error("No supported desktop session detected")]
    UnsupportedSession,

    #[error("Display not found: {display}")]
    DisplayNotFound { display: String },

    // Source errors
    #[error("Invalid source descriptor: {descriptor}")]
    InvalidSource { descriptor: String },

    #[error("Source unavailable '{source_name}': {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("No images were found in any configured source")]
    NoImagesFound,

    #[error("No images available after filtering")]
    NoImagesAvailable,

    // Apply errors
    #[error("Failed to set wallpaper on display '{display}' after {attempts} attempts: {reason}")]
    ApplyFailed {
        display: String,
        attempts: u32,
        reason: String,
    },

    // Persistence errors
    #[error("State file operation failed for '{path}': {reason}")]
    Persistence { path: String, reason: String },

    // External command errors
    #[error("Command failed: {command}: {output}")]
    Provider { command: String, output: String },

    #[error("No usable command found for: {purpose}")]
    NoCommand { purpose: String },

    // Configuration errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl WshError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedSession
                | Self::DisplayNotFound { .. }
                | Self::InvalidSource { .. }
                | Self::NoImagesFound
                | Self::NoImagesAvailable
                | Self::ConfigInvalid(..)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedSession => Some("Supported sessions: Hyprland, Sway, X11, macOS"),
            Self::DisplayNotFound { .. } => {
                Some("Use a display index (0, 1, ...) or a name like eDP-1")
            }
            Self::NoImagesFound | Self::NoImagesAvailable => {
                Some("Check the 'sources' entries in the config file")
            }
            Self::InvalidSource { .. } => {
                Some("Sources are a path, dir://<path>, list://<file>, or ssh://[user@]host/path")
            }
            _ => None,
        }
    }
}

/// Convenience type alias for Results using WshError.
pub type Result<T> = std::result::Result<T, WshError>;
