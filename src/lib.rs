//! Wallshift library - multi-display wallpaper rotation.
//!
//! This library exposes the core functionality of the `wsh` CLI for use in
//! tests and potentially other applications.
//!
//! # Modules
//!
//! - `source`: Image sources (directories, manifests, remote hosts) and fingerprints
//! - `store`: Persisted lists (blacklist, history, collections) and CurrentState
//! - `provider`: Display provider abstraction over desktop sessions
//! - `engine`: Rotation engine and schedule ticker
//! - `cache`: Staging-directory eviction
//! - `session`: Process-wide session facade
//! - `error`: Error types with user-recoverable hints
#![forbid(unsafe_code)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod provider;
pub mod session;
pub mod source;
pub mod store;
