//! Shared helpers for Wayland compositor sessions backed by `swww`.

use std::path::{Path, PathBuf};

use crate::error::{Result, WshError};
use crate::provider::Display;
use crate::provider::command::{expand_template, first_available, run_cmd};

/// Default set-command templates tried in order of preference.
const DEFAULT_SET_CMDS: &[&str] = &["swww img '{{path}}' --outputs '{{display}}'"];

/// Apply a wallpaper on a Wayland display, honoring a custom template.
pub fn set_wallpaper(path: &Path, display: &Display, custom: Option<&str>) -> Result<()> {
    let path = path.display().to_string();
    let cmd = match custom {
        Some(template) => expand_template(template, &path, &display.name),
        None => first_available(DEFAULT_SET_CMDS, &path, &display.name)?,
    };

    run_cmd(&cmd)?;
    Ok(())
}

/// Query the current wallpaper for a display via `swww query`.
///
/// Output lines look like:
/// `eDP-1: 1920x1200, scale: 1, currently displaying: image: /tmp/a.jpg`
pub fn current_wallpaper(display: &Display) -> Result<PathBuf> {
    let output = run_cmd("swww query")?;
    parse_query(&output, &display.name)
}

fn parse_query(output: &str, display_name: &str) -> Result<PathBuf> {
    let line = output
        .lines()
        .find(|line| line.starts_with(display_name))
        .ok_or_else(|| WshError::Provider {
            command: "swww query".to_string(),
            output: format!("no wallpaper reported for display {display_name}"),
        })?;

    let path = line
        .split("image: ")
        .nth(1)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| WshError::Provider {
            command: "swww query".to_string(),
            output: format!("no image in query line for display {display_name}"),
        })?;

    Ok(PathBuf::from(path))
}
