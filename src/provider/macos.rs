//! macOS session provider.
//!
//! Displays come from `system_profiler SPDisplaysDataType -json`; wallpapers
//! are applied and queried with `osascript` against System Events desktops,
//! which are addressed by their 1-based ordinal.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WshError};
use crate::provider::command::run_cmd;
use crate::provider::{Display, DisplayProvider};

pub struct MacOs;

impl MacOs {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for MacOs {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(rename = "SPDisplaysDataType", default)]
    graphics: Vec<GraphicsCard>,
}

#[derive(Debug, Deserialize)]
struct GraphicsCard {
    #[serde(rename = "spdisplays_ndrvs", default)]
    displays: Vec<serde_json::Value>,
}

impl DisplayProvider for MacOs {
    fn list_displays(&self) -> Result<Vec<Display>> {
        let output = run_cmd("system_profiler SPDisplaysDataType -json")?;
        parse_profile(&output)
    }

    fn apply(&self, path: &Path, display: &Display) -> Result<()> {
        let script = format!(
            r#"osascript -e 'tell application "System Events" to set picture of desktop {} to "{}"'"#,
            display.name,
            path.display()
        );
        run_cmd(&script)?;
        Ok(())
    }

    fn current_wallpaper(&self, display: &Display) -> Result<PathBuf> {
        let script = format!(
            r#"osascript -e 'tell application "System Events" to get picture of desktop {}'"#,
            display.name
        );
        let output = run_cmd(&script)?;
        Ok(PathBuf::from(output.trim()))
    }
}

fn parse_profile(output: &str) -> Result<Vec<Display>> {
    let profile: Profile = serde_json::from_str(output).map_err(|e| WshError::Provider {
        command: "system_profiler SPDisplaysDataType -json".to_string(),
        output: e.to_string(),
    })?;

    let mut displays = Vec::new();
    for card in &profile.graphics {
        for _ in &card.displays {
            let ordinal = displays.len() + 1;
            displays.push(Display {
                id: String::new(),
                index: displays.len(),
                name: ordinal.to_string(),
                label: String::new(),
                current: None,
            });
        }
    }

    if displays.is_empty() {
        return Err(WshError::Provider {
            command: "system_profiler SPDisplaysDataType -json".to_string(),
            output: "no displays reported".to_string(),
        });
    }

    Ok(displays)
}
