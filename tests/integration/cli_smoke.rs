//! Binary-level smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::{write_config_file, write_walls};

fn wsh() -> Command {
    Command::cargo_bin("wsh").unwrap()
}

#[test]
fn help_mentions_wallpapers() {
    wsh()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("wallpaper"));
}

#[test]
fn config_path_flag_prints_the_path() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg"]);
    let config = write_config_file(walls.path(), state.path());

    wsh()
        .arg("-c")
        .arg(&config)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yml"));
}

#[test]
fn config_show_renders_yaml() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg"]);
    let config = write_config_file(walls.path(), state.path());

    wsh()
        .arg("-c")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("history_size"));
}

#[test]
fn completions_generate_for_bash() {
    wsh()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wsh"));
}

#[test]
#[cfg(target_os = "linux")]
fn unsupported_session_fails_with_hint() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg"]);
    let config = write_config_file(walls.path(), state.path());

    wsh()
        .arg("-c")
        .arg(&config)
        .arg("current")
        .env_remove("XDG_CURRENT_DESKTOP")
        .env_remove("XDG_SESSION_TYPE")
        .env_remove("XAUTHORITY")
        .env_remove("I3SOCK")
        .env_remove("SWAYSOCK")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No supported desktop session"));
}
