//! Rotation engine.
//!
//! One rotation cycle builds a filtered candidate pool, fans out one worker
//! task per target display, applies a distinct image to each display while
//! supply allows, persists current/history state under a serialized
//! critical section, and finally reconciles the staging directory. The
//! schedule loop drives cycles from a live-adjustable [`ticker::Ticker`]
//! until cancelled.

pub mod ticker;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, error, info, warn};

use crate::cache;
use crate::config::Config;
use crate::error::{Result, WshError};
use crate::provider::{Display, SharedProvider};
use crate::session::Session;
use crate::source::{self, Image};
use crate::store;

/// Build the candidate pool for one cycle.
///
/// Blacklisted images are always removed. History is only filtered out when
/// the remaining pool is strictly larger than `history_size`; a small
/// collection would otherwise starve itself.
pub fn build_pool(cfg: &Config) -> Result<Vec<Image>> {
    let images = source::resolve_sources(&cfg.sources)?;

    let blacklist = store::read_list(&cfg.blacklist_file)?;
    let mut pool = source::filter_images(&images, &blacklist);

    if !cfg.ignore_history {
        let history = store::read_list(&cfg.history_file)?;
        if pool.len() > cfg.history_size {
            debug!(
                history = history.len(),
                history_size = cfg.history_size,
                "filtering images in history"
            );
            pool = source::filter_images(&pool, &history);
        }
    }

    if pool.is_empty() {
        return Err(WshError::NoImagesAvailable);
    }

    Ok(pool)
}

/// Shared per-cycle state handed to every display worker.
struct CycleContext {
    provider: SharedProvider,
    cache_dir: PathBuf,
    current_file: PathBuf,
    history_file: PathBuf,
    history_size: usize,
    no_track: bool,
    max_retries: u32,
    backoff: Duration,
    target_count: usize,
    /// Candidate pool, guarded for both selection and removal.
    pool: StdMutex<Vec<Image>>,
    /// Serializes current/history writes across display workers.
    state_lock: AsyncMutex<()>,
}

/// Run one rotation cycle over `targets`.
///
/// Workers run concurrently, one per display. Per-display failures are
/// isolated: a display that exhausts its retries reports an error without
/// cancelling its siblings. The first error, if any, is surfaced after all
/// workers join; otherwise the staging directory is reconciled.
///
/// Reuse policy: images are drawn uniformly at random from the shared pool.
/// A successfully applied image is removed from the pool only while the pool
/// still has at least as many images as there are target displays, so
/// repeats across displays happen only when supply is scarce.
pub async fn run_cycle(provider: SharedProvider, cfg: &Config, targets: &[Display]) -> Result<()> {
    if targets.is_empty() {
        warn!("no target displays; nothing to rotate");
        return Ok(());
    }

    let pool = build_pool(cfg)?;
    debug!(
        pool = pool.len(),
        displays = targets.len(),
        "starting rotation cycle"
    );

    let ctx = Arc::new(CycleContext {
        provider,
        cache_dir: cfg.cache_dir.clone(),
        current_file: cfg.current_file.clone(),
        history_file: cfg.history_file.clone(),
        history_size: cfg.history_size,
        no_track: cfg.no_track,
        max_retries: cfg.max_retries,
        backoff: cfg.retry_interval_duration(),
        target_count: targets.len(),
        pool: StdMutex::new(pool),
        state_lock: AsyncMutex::new(()),
    });

    let mut handles = Vec::with_capacity(targets.len());
    for display in targets.iter().cloned() {
        let ctx = Arc::clone(&ctx);
        handles.push(tokio::spawn(assign_display(ctx, display)));
    }

    let mut first_err = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "display worker failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Err(e) => {
                error!(error = %e, "display worker panicked");
                if first_err.is_none() {
                    first_err = Some(WshError::Other(format!("display worker panicked: {e}")));
                }
            }
        }
    }

    if let Some(e) = first_err {
        return Err(e);
    }

    let protected = protected_paths(cfg)?;
    cache::reconcile(&cfg.cache_dir, cfg.cache_size, &protected)?;

    Ok(())
}

/// Paths of every display's current image, which eviction must not touch.
fn protected_paths(cfg: &Config) -> Result<HashSet<PathBuf>> {
    let state = store::read_current(&cfg.current_file)?;
    Ok(state
        .displays
        .iter()
        .filter_map(|d| d.current.as_ref())
        .map(|image| image.path.clone())
        .collect())
}

/// Assign one image to one display, with bounded retries.
async fn assign_display(ctx: Arc<CycleContext>, display: Display) -> Result<()> {
    let mut last_reason = String::new();
    let display_key = display.key();

    for attempt in 1..=ctx.max_retries {
        let candidate = {
            let pool = ctx.pool.lock().expect("pool lock poisoned");
            source::pick_random(&pool)
        };
        let Some(candidate) = candidate else {
            return Err(WshError::NoImagesAvailable);
        };

        // Remote images are fetched into staging before they are usable;
        // a failed fetch consumes an attempt like a failed apply.
        let staged = {
            let cache_dir = ctx.cache_dir.clone();
            let image = candidate.clone();
            tokio::task::spawn_blocking(move || source::materialize(&image, &cache_dir))
                .await
                .map_err(|e| WshError::Other(format!("fetch task panicked: {e}")))?
        };
        let staged = match staged {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    display = %display_key,
                    attempt,
                    backoff_secs = ctx.backoff.as_secs(),
                    error = %e,
                    "image fetch failed; retrying"
                );
                last_reason = e.to_string();
                tokio::time::sleep(ctx.backoff).await;
                continue;
            }
        };

        let applied = {
            let provider = Arc::clone(&ctx.provider);
            let target = display.clone();
            let path = staged.path.clone();
            tokio::task::spawn_blocking(move || provider.apply(&path, &target))
                .await
                .map_err(|e| WshError::Other(format!("apply task panicked: {e}")))?
        };
        if let Err(e) = applied {
            warn!(
                display = %display_key,
                attempt,
                backoff_secs = ctx.backoff.as_secs(),
                error = %e,
                "apply failed; retrying"
            );
            last_reason = e.to_string();
            tokio::time::sleep(ctx.backoff).await;
            continue;
        }

        // Keep assignments distinct while supply allows.
        {
            let mut pool = ctx.pool.lock().expect("pool lock poisoned");
            if pool.len() >= ctx.target_count {
                source::remove_image(&mut pool, &staged);
            }
        }

        if !ctx.no_track {
            // State writes are serialized across workers; a persistence
            // failure is fatal to this worker, not retried.
            let _guard = ctx.state_lock.lock().await;
            store::write_current(&ctx.current_file, &display, &staged)?;
            store::append(&ctx.history_file, staged.clone())?;
            store::trim(&ctx.history_file, ctx.history_size)?;
        }

        info!(display = %display_key, image = %staged.path.display(), "set wallpaper");
        return Ok(());
    }

    Err(WshError::ApplyFailed {
        display: display.key().to_string(),
        attempts: ctx.max_retries,
        reason: last_reason,
    })
}

/// Drive scheduled rotation cycles until `shutdown` fires.
///
/// Cycle failures are logged and the loop continues to the next tick;
/// cancellation is only observed between cycles, never mid-apply.
pub async fn run(session: Arc<Session>, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        interval_secs = session.ticker().interval().as_secs(),
        "starting rotation schedule"
    );

    loop {
        tokio::select! {
            () = session.ticker().tick() => {}
            _ = shutdown.changed() => {
                info!("rotation schedule stopped");
                return Ok(());
            }
        }

        // Re-query displays from the already-chosen provider; detection
        // itself is never re-run.
        let refresher = Arc::clone(&session);
        let refreshed = tokio::task::spawn_blocking(move || refresher.refresh())
            .await
            .map_err(|e| WshError::Other(format!("refresh task panicked: {e}")))?;
        if let Err(e) = refreshed {
            error!(error = %e, "display refresh failed");
        }

        match session.rotate_now(None).await {
            Ok(()) => {
                let interval = session.ticker().interval();
                info!(next = %next_tick(interval), "next rotation scheduled");
            }
            Err(e) => error!(error = %e, "rotation cycle failed"),
        }
    }
}

/// Wall-clock time of the next tick, for log lines.
fn next_tick(interval: Duration) -> String {
    let delta = chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero());
    (chrono::Local::now() + delta)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
