//! Persisted state formats and round-trips.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use wsh::provider::Display;
use wsh::source::Image;
use wsh::store;

fn image(fp: &str, path: &str) -> Image {
    Image {
        source: String::new(),
        path: PathBuf::from(path),
        fingerprint: Some(fp.to_string()),
    }
}

#[test]
fn current_state_roundtrip_preserves_both_displays() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("current.json");

    let a = Display {
        id: "0".to_string(),
        index: 0,
        name: "eDP-1".to_string(),
        ..Default::default()
    };
    let b = Display {
        id: "1".to_string(),
        index: 1,
        name: "HDMI-1".to_string(),
        ..Default::default()
    };

    store::write_current(&path, &a, &image("aa", "/walls/a.jpg")).unwrap();
    store::write_current(&path, &b, &image("bb", "/walls/b.jpg")).unwrap();

    let state = store::read_current(&path).unwrap();
    assert_eq!(state.displays.len(), 2);
    assert_eq!(
        state.display("0").unwrap().current.as_ref().unwrap().path,
        PathBuf::from("/walls/a.jpg")
    );
    assert_eq!(
        state.display("HDMI-1").unwrap().current.as_ref().unwrap().path,
        PathBuf::from("/walls/b.jpg")
    );
}

#[test]
fn persisted_files_are_pretty_printed_json() {
    let temp = TempDir::new().unwrap();
    let list_path = temp.path().join("list.json");
    let current_path = temp.path().join("current.json");

    store::append(&list_path, image("aa", "/walls/a.jpg")).unwrap();
    let display = Display {
        id: "0".to_string(),
        name: "eDP-1".to_string(),
        ..Default::default()
    };
    store::write_current(&current_path, &display, &image("aa", "/walls/a.jpg")).unwrap();

    let list_raw = fs::read_to_string(&list_path).unwrap();
    assert!(list_raw.contains("\n  "), "list must be pretty-printed");
    assert!(list_raw.contains("\"fingerprint\""));

    let current_raw = fs::read_to_string(&current_path).unwrap();
    assert!(current_raw.contains("\"displays\""));
    assert!(current_raw.contains("\"current\""));
}

#[test]
fn concurrent_sibling_lists_do_not_interfere() {
    let temp = TempDir::new().unwrap();
    let history = temp.path().join("history.json");
    let blacklist = temp.path().join("blacklist.json");

    store::append(&history, image("aa", "/walls/a.jpg")).unwrap();
    store::append(&blacklist, image("bb", "/walls/b.jpg")).unwrap();
    store::trim(&history, 10).unwrap();

    assert_eq!(store::read_list(&history).unwrap().len(), 1);
    assert_eq!(store::read_list(&blacklist).unwrap().len(), 1);
}

#[test]
fn list_append_rejects_duplicates_across_paths() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("list.json");

    store::append(&path, image("same", "/a/x.jpg")).unwrap();
    store::append(&path, image("same", "/b/y.jpg")).unwrap();

    assert_eq!(store::read_list(&path).unwrap().len(), 1);
}
