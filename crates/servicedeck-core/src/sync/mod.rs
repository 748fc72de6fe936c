//! Controllers that keep local state in step with the remote services.
//!
//! - `CollectionSync`: users and products collections, bootstrap load and
//!   create forms
//! - `CacheClient`: a single observed key/value pair plus the service clock
//!
//! Each controller owns its state exclusively. Network calls run in spawned
//! tokio tasks that report back over the controller's own channel; the owner
//! applies the results on its event loop via `check_background_tasks` (or
//! `wait_for_update` when it has nothing else to do). Results are applied in
//! the order they arrive, so when two identical requests are in flight the
//! one that resolves last determines the final state. Collection loads are
//! the exception: each carries a generation, and only the most recently
//! started load may replace the collections.

pub mod cache_client;
pub mod collections;

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::error;

pub use cache_client::CacheClient;
pub use collections::{CollectionSync, ProductForm, UserForm};

/// Buffer size for the background task channels.
/// Operations are user-initiated, so a small buffer has plenty of headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Lifecycle of the collection bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    LoadFailed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Idle => write!(f, "idle"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::Ready => write!(f, "ready"),
            LoadState::LoadFailed => write!(f, "load failed"),
        }
    }
}

/// Operations rejected locally, before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Collections are {0}; items can only be created once loading has succeeded")]
    NotReady(LoadState),

    #[error("Price must be a number, got {0:?}")]
    InvalidPrice(String),
}

/// Helper to send task results, logging any channel errors
async fn send_result<T>(tx: &mpsc::Sender<T>, result: T) {
    if tx.send(result).await.is_err() {
        error!("Failed to send task result - channel closed");
    }
}
