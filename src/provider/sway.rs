//! Sway session provider.
//!
//! Displays come from `swaymsg -t get_outputs`; wallpapers go through the
//! shared `swww` helpers. Sway reports no numeric output id, so these
//! displays key on their name.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WshError};
use crate::provider::command::run_cmd;
use crate::provider::{Display, DisplayProvider, wayland};

pub struct Sway {
    set_command: Option<String>,
}

impl Sway {
    pub const fn new(set_command: Option<String>) -> Self {
        Self { set_command }
    }
}

#[derive(Debug, Deserialize)]
struct Output {
    name: String,
    #[serde(default)]
    make: String,
    #[serde(default)]
    model: String,
}

impl DisplayProvider for Sway {
    fn list_displays(&self) -> Result<Vec<Display>> {
        let output = run_cmd("swaymsg -t get_outputs")?;
        parse_outputs(&output)
    }

    fn apply(&self, path: &Path, display: &Display) -> Result<()> {
        wayland::set_wallpaper(path, display, self.set_command.as_deref())
    }

    fn current_wallpaper(&self, display: &Display) -> Result<PathBuf> {
        wayland::current_wallpaper(display)
    }
}

fn parse_outputs(output: &str) -> Result<Vec<Display>> {
    let outputs: Vec<Output> = serde_json::from_str(output).map_err(|e| WshError::Provider {
        command: "swaymsg -t get_outputs".to_string(),
        output: e.to_string(),
    })?;

    Ok(outputs
        .into_iter()
        .enumerate()
        .map(|(index, o)| {
            let label = format!("{} {}", o.make, o.model).trim().to_string();
            Display {
                id: String::new(),
                index,
                name: o.name,
                label,
                current: None,
            }
        })
        .collect())
}
