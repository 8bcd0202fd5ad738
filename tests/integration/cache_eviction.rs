//! Staging-directory reconciliation after rotation cycles.

use std::fs;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use tempfile::TempDir;

use wsh::provider::SessionKind;
use wsh::provider::mock::MockProvider;
use wsh::session::Session;

use crate::common::test_config;

#[tokio::test]
async fn eviction_protects_the_current_wallpaper_even_when_oldest() {
    let state = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    // The staging directory doubles as the only image source, so the chosen
    // image is the oldest cache entry.
    let wall = cache.path().join("wall.jpg");
    fs::write(&wall, b"pixels").unwrap();
    sleep(Duration::from_millis(10));
    for name in ["newer1.txt", "newer2.txt"] {
        fs::write(cache.path().join(name), name).unwrap();
        sleep(Duration::from_millis(10));
    }

    let mut cfg = test_config(cache.path(), state.path());
    cfg.cache_dir = cache.path().to_path_buf();
    cfg.cache_size = 1;

    let mock = Arc::new(MockProvider::with_displays(1));
    let session = Session::with_provider(cfg, SessionKind::Hyprland, mock.clone()).unwrap();

    session.rotate_now(None).await.unwrap();

    // The applied image survives; the newer but unprotected entries go.
    assert!(wall.exists(), "current wallpaper must never be evicted");
    assert!(!cache.path().join("newer1.txt").exists());
    assert!(!cache.path().join("newer2.txt").exists());
}

#[tokio::test]
async fn eviction_is_skipped_when_cycle_fails() {
    let state = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();

    let wall = cache.path().join("wall.jpg");
    fs::write(&wall, b"pixels").unwrap();
    for name in ["stale1.txt", "stale2.txt"] {
        fs::write(cache.path().join(name), name).unwrap();
    }

    let mut cfg = test_config(cache.path(), state.path());
    cfg.cache_dir = cache.path().to_path_buf();
    cfg.cache_size = 1;
    cfg.max_retries = 1;

    let mock = Arc::new(MockProvider::with_displays(1));
    let session = Session::with_provider(cfg, SessionKind::Hyprland, mock.clone()).unwrap();
    let display = session.display("0").unwrap();
    mock.fail_applies_forever(&display);

    assert!(session.rotate_now(None).await.is_err());

    // A failed cycle leaves the staging directory untouched.
    assert_eq!(fs::read_dir(cache.path()).unwrap().count(), 3);
}
