//! X11 session provider.
//!
//! Displays come from `xrandr --listactivemonitors`, addressed by index.
//! There is no reliable query mechanism across X wallpaper setters, so the
//! current wallpaper falls back to the persisted state.

use std::path::{Path, PathBuf};

use crate::error::{Result, WshError};
use crate::provider::command::{expand_template, first_available, run_cmd};
use crate::provider::{Display, DisplayProvider};

/// Default set-command templates tried in order of preference.
const DEFAULT_SET_CMDS: &[&str] = &[
    "nitrogen --head={{display}} --set-zoom-fill -- '{{path}}'",
    "feh --bg-fill --no-xinerama --display {{display}} '{{path}}'",
    "xwallpaper --output {{display}} --zoom '{{path}}'",
    "xsetbg -display {{display}} '{{path}}'",
];

pub struct Xorg {
    set_command: Option<String>,
}

impl Xorg {
    pub const fn new(set_command: Option<String>) -> Self {
        Self { set_command }
    }
}

impl DisplayProvider for Xorg {
    fn list_displays(&self) -> Result<Vec<Display>> {
        let output = run_cmd("xrandr --listactivemonitors")?;
        parse_monitors(&output)
    }

    fn apply(&self, path: &Path, display: &Display) -> Result<()> {
        let path = path.display().to_string();
        let cmd = match self.set_command.as_deref() {
            Some(template) => expand_template(template, &path, &display.id),
            None => first_available(DEFAULT_SET_CMDS, &path, &display.id)?,
        };

        run_cmd(&cmd)?;
        Ok(())
    }

    fn current_wallpaper(&self, display: &Display) -> Result<PathBuf> {
        display
            .current
            .as_ref()
            .map(|image| image.path.clone())
            .ok_or_else(|| WshError::Provider {
                command: "xrandr".to_string(),
                output: format!("no recorded wallpaper for display {}", display.key()),
            })
    }
}

/// Parse `xrandr --listactivemonitors` output.
///
/// ```text
/// Monitors: 2
///  0: +*eDP-1 1920/301x1200/188+0+0  eDP-1
///  1: +HDMI-1 2560/597x1440/336+1920+0  HDMI-1
/// ```
fn parse_monitors(output: &str) -> Result<Vec<Display>> {
    let mut displays = Vec::new();

    for line in output.lines() {
        if !line.starts_with(char::is_whitespace) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(ordinal) = fields.next() else {
            continue;
        };
        let Ok(index) = ordinal.trim_end_matches(':').parse::<usize>() else {
            continue;
        };

        let connector = fields.next_back().unwrap_or_default().to_string();
        displays.push(Display {
            id: index.to_string(),
            index,
            name: index.to_string(),
            label: connector,
            current: None,
        });
    }

    if displays.is_empty() {
        return Err(WshError::Provider {
            command: "xrandr --listactivemonitors".to_string(),
            output: "no active monitors reported".to_string(),
        });
    }

    Ok(displays)
}
