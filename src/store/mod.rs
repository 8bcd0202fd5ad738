//! Persistent list and state storage.
//!
//! Lists (blacklist, history, named collections) are pretty-printed JSON
//! arrays of images, append-only except for trimming. The CurrentState record
//! maps each display to the image currently applied there; writes are
//! per-display upserts that never disturb sibling entries. Every rewrite goes
//! through a temp-file-and-rename so a crashed writer cannot leave a torn
//! file behind.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, WshError};
use crate::provider::Display;
use crate::source::{self, Image};

fn persistence_err(path: &Path, err: impl std::fmt::Display) -> WshError {
    WshError::Persistence {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Serialize `value` to `path` as pretty JSON, atomically.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value).map_err(|e| persistence_err(path, e))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| persistence_err(path, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp, data).map_err(|e| persistence_err(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| persistence_err(path, e))?;
    Ok(())
}

/// Read a list of images from a file. A missing file is an empty list.
pub fn read_list(path: &Path) -> Result<Vec<Image>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path).map_err(|e| persistence_err(path, e))?;
    serde_json::from_str(&data).map_err(|e| persistence_err(path, e))
}

/// Append an image to a list file.
///
/// Computes the fingerprint if absent. An image already present (by
/// fingerprint) is a warned no-op, never a duplicate entry.
pub fn append(path: &Path, mut image: Image) -> Result<()> {
    image.ensure_fingerprint()?;

    let mut list = read_list(path)?;
    if source::in_list(&image, &list) {
        warn!(image = %image.path.display(), list = %path.display(), "image already in list");
        return Ok(());
    }

    debug!(image = %image.path.display(), list = %path.display(), "appending to list");
    list.push(image);
    write_json_atomic(path, &list)
}

/// Keep only the most recent `max_len` entries of a list file.
pub fn trim(path: &Path, max_len: usize) -> Result<()> {
    let list = read_list(path)?;
    if list.len() <= max_len {
        return Ok(());
    }

    let trimmed: Vec<Image> = list[list.len() - max_len..].to_vec();
    write_json_atomic(path, &trimmed)
}

/// Enumerate the named lists (file stems) in a lists directory.
pub fn list_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| persistence_err(dir, e))? {
        let entry = entry.map_err(|e| persistence_err(dir, e))?;
        if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// The durable record of which image is applied to each display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentState {
    #[serde(default)]
    pub displays: Vec<Display>,
}

impl CurrentState {
    /// Look up a display's entry by id or name.
    pub fn display(&self, reference: &str) -> Option<&Display> {
        self.displays
            .iter()
            .find(|d| d.id == reference || d.name == reference)
    }
}

/// Read the CurrentState record. A missing file is an empty record.
pub fn read_current(path: &Path) -> Result<CurrentState> {
    if !path.exists() {
        return Ok(CurrentState::default());
    }

    let data = fs::read_to_string(path).map_err(|e| persistence_err(path, e))?;
    serde_json::from_str(&data).map_err(|e| persistence_err(path, e))
}

/// Upsert one display's current image into the CurrentState record.
///
/// Only the entry matching the display's identity key is replaced; every
/// other display's entry is preserved verbatim. Callers running concurrent
/// display workers must serialize these writes externally.
pub fn write_current(path: &Path, display: &Display, image: &Image) -> Result<()> {
    let mut updated = display.clone();
    updated.current = Some(image.clone());

    let mut state = read_current(path)?;
    match state
        .displays
        .iter_mut()
        .find(|d| d.key() == updated.key())
    {
        Some(entry) => *entry = updated,
        None => state.displays.push(updated),
    }

    write_json_atomic(path, &state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn image_with_fp(fp: &str) -> Image {
        Image {
            source: String::new(),
            path: PathBuf::from(format!("/walls/{fp}.jpg")),
            fingerprint: Some(fp.to_string()),
        }
    }

    fn display(id: &str, name: &str) -> Display {
        Display {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_read_missing_list_is_empty() {
        let temp = TempDir::new().unwrap();
        let list = read_list(&temp.path().join("absent.json")).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_append_and_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");

        append(&path, image_with_fp("1")).unwrap();
        append(&path, image_with_fp("2")).unwrap();

        let list = read_list(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].fingerprint.as_deref(), Some("1"));
    }

    #[test]
    fn test_append_duplicate_is_noop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("list.json");

        append(&path, image_with_fp("1")).unwrap();
        // Same fingerprint at a different path is the same image.
        let mut dup = image_with_fp("1");
        dup.path = PathBuf::from("/elsewhere/copy.jpg");
        append(&path, dup).unwrap();

        assert_eq!(read_list(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_trim_keeps_most_recent_in_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");

        for fp in ["1", "2", "3", "4"] {
            append(&path, image_with_fp(fp)).unwrap();
        }
        trim(&path, 2).unwrap();

        let list = read_list(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].fingerprint.as_deref(), Some("3"));
        assert_eq!(list[1].fingerprint.as_deref(), Some("4"));
    }

    #[test]
    fn test_trim_noop_when_within_bound() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");
        append(&path, image_with_fp("1")).unwrap();

        trim(&path, 5).unwrap();
        assert_eq!(read_list(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_write_current_upsert_preserves_siblings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("current.json");

        let a = display("0", "eDP-1");
        let b = display("1", "HDMI-1");

        write_current(&path, &a, &image_with_fp("aa")).unwrap();
        write_current(&path, &b, &image_with_fp("bb")).unwrap();
        // Updating A again must not disturb B.
        write_current(&path, &a, &image_with_fp("aa2")).unwrap();

        let state = read_current(&path).unwrap();
        assert_eq!(state.displays.len(), 2);

        let a_entry = state.display("0").unwrap();
        assert_eq!(
            a_entry.current.as_ref().unwrap().fingerprint.as_deref(),
            Some("aa2")
        );
        let b_entry = state.display("1").unwrap();
        assert_eq!(
            b_entry.current.as_ref().unwrap().fingerprint.as_deref(),
            Some("bb")
        );
    }

    #[test]
    fn test_write_current_keys_on_name_without_id() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("current.json");

        // Sway-style displays: no stable id, names only.
        let a = display("", "eDP-1");
        let b = display("", "DP-3");

        write_current(&path, &a, &image_with_fp("aa")).unwrap();
        write_current(&path, &b, &image_with_fp("bb")).unwrap();

        let state = read_current(&path).unwrap();
        assert_eq!(state.displays.len(), 2);
        assert!(state.display("DP-3").is_some());
    }

    #[test]
    fn test_read_missing_current_is_empty() {
        let temp = TempDir::new().unwrap();
        let state = read_current(&temp.path().join("absent.json")).unwrap();
        assert!(state.displays.is_empty());
    }

    #[test]
    fn test_list_names() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("favorites.json"), "[]").unwrap();
        fs::write(temp.path().join("nature.json"), "[]").unwrap();

        let names = list_names(temp.path()).unwrap();
        assert_eq!(names, vec!["favorites".to_string(), "nature".to_string()]);
    }

    #[test]
    fn test_corrupt_list_is_persistence_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            read_list(&path).unwrap_err(),
            WshError::Persistence { .. }
        ));
    }
}
