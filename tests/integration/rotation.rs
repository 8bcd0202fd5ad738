//! End-to-end rotation behavior through the session facade.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::watch;

use wsh::engine;
use wsh::provider::SessionKind;
use wsh::provider::mock::MockProvider;
use wsh::session::Session;
use wsh::store;

use crate::common::{test_config, write_walls};

fn session_with(displays: usize, cfg: wsh::config::Config) -> (Arc<Session>, Arc<MockProvider>) {
    let mock = Arc::new(MockProvider::with_displays(displays));
    let session =
        Arc::new(Session::with_provider(cfg, SessionKind::Hyprland, mock.clone()).unwrap());
    (session, mock)
}

#[tokio::test]
async fn rotation_assigns_distinct_images_across_displays() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);

    let (session, mock) = session_with(2, test_config(walls.path(), state.path()));
    session.rotate_now(None).await.unwrap();

    let applied: HashSet<PathBuf> = session
        .displays()
        .iter()
        .map(|d| mock.applied(d).expect("display has a wallpaper"))
        .collect();
    assert_eq!(applied.len(), 2);
}

#[tokio::test]
async fn blacklist_rotates_the_image_away() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg", "b.jpg"]);
    let cfg = test_config(walls.path(), state.path());
    let blacklist_file = cfg.blacklist_file.clone();

    let (session, mock) = session_with(1, cfg);
    session.rotate_now(None).await.unwrap();

    let display = session.display("0").unwrap();
    let before = mock.applied(&display).unwrap();

    session.blacklist("0").await.unwrap();

    let blacklist = store::read_list(&blacklist_file).unwrap();
    assert_eq!(blacklist.len(), 1);
    assert_eq!(blacklist[0].path, before);

    // Two images, one blacklisted: the replacement is forced to differ.
    let after = mock.applied(&display).unwrap();
    assert_ne!(after, before);
}

#[tokio::test]
async fn history_is_trimmed_to_configured_size() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]);
    let mut cfg = test_config(walls.path(), state.path());
    cfg.history_size = 2;
    let history_file = cfg.history_file.clone();

    let (session, _mock) = session_with(1, cfg);
    for _ in 0..4 {
        session.rotate_now(None).await.unwrap();
    }

    let history = store::read_list(&history_file).unwrap();
    assert!(history.len() <= 2, "history kept {} entries", history.len());
}

#[tokio::test]
async fn failed_display_does_not_block_siblings() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg", "b.jpg"]);
    let mut cfg = test_config(walls.path(), state.path());
    cfg.max_retries = 2;
    let current_file = cfg.current_file.clone();

    let (session, mock) = session_with(2, cfg);
    let displays = session.displays();
    mock.fail_applies_forever(&displays[0]);

    assert!(session.rotate_now(None).await.is_err());

    // The healthy display applied and persisted its state.
    assert!(mock.applied(&displays[1]).is_some());
    let state = store::read_current(&current_file).unwrap();
    assert!(state.display("1").is_some());
    assert!(state.display("0").is_none());
}

#[tokio::test]
async fn schedule_loop_rotates_and_stops_on_shutdown() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg", "b.jpg"]);

    let (session, mock) = session_with(1, test_config(walls.path(), state.path()));
    // Drive the ticker directly; config validation bounds do not apply to
    // runtime re-arming.
    session.ticker().set(Duration::from_millis(30));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine::run(session.clone(), shutdown_rx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(true).unwrap();
    engine_task.await.unwrap().unwrap();

    let display = session.display("0").unwrap();
    assert!(mock.applied(&display).is_some(), "schedule applied at least once");
}

#[tokio::test]
async fn paused_schedule_issues_no_cycles() {
    let walls = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();
    write_walls(walls.path(), &["a.jpg"]);

    let (session, mock) = session_with(1, test_config(walls.path(), state.path()));
    assert!(session.ticker().is_paused());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine::run(session.clone(), shutdown_rx));

    tokio::time::sleep(Duration::from_millis(120)).await;
    shutdown_tx.send(true).unwrap();
    engine_task.await.unwrap().unwrap();

    let display = session.display("0").unwrap();
    assert!(mock.applied(&display).is_none(), "paused engine must stay idle");
}
