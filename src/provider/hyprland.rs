//! Hyprland session provider.
//!
//! Displays come from `hyprctl -j monitors` (scoped to the first running
//! instance); wallpapers are applied and queried through the shared `swww`
//! helpers.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, WshError};
use crate::provider::command::run_cmd;
use crate::provider::{Display, DisplayProvider, wayland};

pub struct Hyprland {
    set_command: Option<String>,
}

impl Hyprland {
    pub const fn new(set_command: Option<String>) -> Self {
        Self { set_command }
    }

    /// Resolve the Hyprland instance signature to scope hyprctl calls.
    fn instance(&self) -> Result<String> {
        let output = run_cmd("hyprctl -j instances")?;
        let instances: Vec<Instance> =
            serde_json::from_str(&output).map_err(|e| WshError::Provider {
                command: "hyprctl -j instances".to_string(),
                output: e.to_string(),
            })?;

        let first = instances.first().ok_or_else(|| WshError::Provider {
            command: "hyprctl -j instances".to_string(),
            output: "no running instances".to_string(),
        })?;

        debug!(instance = %first.instance, "found hyprland instance");
        Ok(first.instance.clone())
    }
}

#[derive(Debug, Deserialize)]
struct Instance {
    instance: String,
}

#[derive(Debug, Deserialize)]
struct Monitor {
    id: i64,
    name: String,
    #[serde(default)]
    description: String,
}

impl DisplayProvider for Hyprland {
    fn list_displays(&self) -> Result<Vec<Display>> {
        let instance = self.instance()?;
        let cmd = format!("hyprctl -i {instance} -j monitors");
        let output = run_cmd(&cmd)?;
        parse_monitors(&output)
    }

    fn apply(&self, path: &Path, display: &Display) -> Result<()> {
        wayland::set_wallpaper(path, display, self.set_command.as_deref())
    }

    fn current_wallpaper(&self, display: &Display) -> Result<PathBuf> {
        wayland::current_wallpaper(display)
    }
}

fn parse_monitors(output: &str) -> Result<Vec<Display>> {
    let monitors: Vec<Monitor> = serde_json::from_str(output).map_err(|e| WshError::Provider {
        command: "hyprctl -j monitors".to_string(),
        output: e.to_string(),
    })?;

    Ok(monitors
        .into_iter()
        .enumerate()
        .map(|(index, m)| Display {
            id: m.id.to_string(),
            index,
            name: m.name,
            label: m.description,
            current: None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_monitors() {
        let json = r#"[
            {"id": 0, "name": "eDP-1", "description": "BOE 0x0951"},
            {"id": 1, "name": "DP-1", "description": "Dell U2720Q"}
        ]"#;

        let displays = parse_monitors(json).unwrap();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].id, "0");
        assert_eq!(displays[0].name, "eDP-1");
        assert_eq!(displays[1].index, 1);
        assert_eq!(displays[1].label, "Dell U2720Q");
    }

    #[test]
    fn test_parse_monitors_bad_json() {
        assert!(parse_monitors("not json").is_err());
    }
}
