//! Scalar cache client: a window onto one key of the remote cache at a time.
//!
//! The client holds at most one observed entry and one status message. Every
//! outcome replaces them outright; nothing is merged and no local index of
//! keys is kept. A miss clears the held entry, while a failed lookup leaves
//! it in place.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{is_dot_segment, ApiClient, ApiResult, CacheDeletion, CacheLookup};
use crate::models::{CacheEntry, StatusMessage};
use crate::utils::format_local_timestamp;

use super::{send_result, CHANNEL_BUFFER_SIZE};

// ============================================================================
// Messages
// ============================================================================

pub const MISSING_KEY_AND_VALUE: &str = "Please enter both key and value.";
pub const MISSING_KEY: &str = "Please enter a key.";
pub const UNSUPPORTED_KEY: &str = "Keys \".\" and \"..\" are not supported.";
pub const KEY_NOT_FOUND: &str = "Key not found.";
pub const SET_FAILED: &str = "Error setting cache.";
pub const GET_FAILED: &str = "Error fetching cache.";
pub const DELETE_FAILED: &str = "Error deleting key.";

/// Shown in place of the clock until the time fetch succeeds
pub const TIME_LOADING: &str = "Loading...";

/// Results sent back from background tasks
#[derive(Debug)]
enum CacheEvent {
    Time(ApiResult<f64>),
    Stored(ApiResult<StatusMessage>),
    Lookup(CacheLookup),
    Deleted(ApiResult<CacheDeletion>),
}

/// Client for the key/value cache service.
///
/// Operations spawn tokio tasks, so they must be called from within a
/// runtime. Each returns whether a request was sent; a `false` means the
/// input failed validation and the message says why.
pub struct CacheClient {
    api: ApiClient,
    pub key_input: String,
    pub value_input: String,
    entry: Option<CacheEntry>,
    message: Option<String>,
    time: Option<String>,
    mounted: bool,
    /// Spawned tasks whose result has not been applied yet
    pending: usize,
    events_tx: mpsc::Sender<CacheEvent>,
    events_rx: mpsc::Receiver<CacheEvent>,
}

impl CacheClient {
    pub fn new(api: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            api,
            key_input: String::new(),
            value_input: String::new(),
            entry: None,
            message: None,
            time: None,
            mounted: false,
            pending: 0,
            events_tx,
            events_rx,
        }
    }

    /// The most recently observed entry
    pub fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    /// Outcome of the most recent operation
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The service clock, or `Loading...` until it has been fetched
    pub fn time_display(&self) -> &str {
        self.time.as_deref().unwrap_or(TIME_LOADING)
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Fetch the service clock. Only the first call has an effect.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        let api = self.api.clone();
        self.spawn(|tx| async move {
            let result = api.fetch_time().await;
            send_result(&tx, CacheEvent::Time(result)).await;
        });
    }

    /// Store the value input under the key input
    pub fn set(&mut self) -> bool {
        if self.key_input.is_empty() || self.value_input.is_empty() {
            self.message = Some(MISSING_KEY_AND_VALUE.to_string());
            return false;
        }
        // Stored under such a key, the entry could never be read back
        if is_dot_segment(&self.key_input) {
            self.message = Some(UNSUPPORTED_KEY.to_string());
            return false;
        }
        let entry = CacheEntry {
            key: self.key_input.clone(),
            value: self.value_input.clone(),
        };
        debug!(key = %entry.key, "Setting cache entry");

        let api = self.api.clone();
        self.spawn(|tx| async move {
            let result = api.set_cache(&entry).await;
            send_result(&tx, CacheEvent::Stored(result)).await;
        });
        true
    }

    /// Look up the key input
    pub fn get(&mut self) -> bool {
        let Some(key) = self.require_key() else {
            return false;
        };
        debug!(key = %key, "Fetching cache entry");

        let api = self.api.clone();
        self.spawn(|tx| async move {
            let lookup = api.get_cache(&key).await;
            send_result(&tx, CacheEvent::Lookup(lookup)).await;
        });
        true
    }

    /// Delete the key input
    pub fn delete(&mut self) -> bool {
        let Some(key) = self.require_key() else {
            return false;
        };
        debug!(key = %key, "Deleting cache entry");

        let api = self.api.clone();
        self.spawn(|tx| async move {
            let result = api.delete_cache(&key).await;
            send_result(&tx, CacheEvent::Deleted(result)).await;
        });
        true
    }

    fn require_key(&mut self) -> Option<String> {
        if self.key_input.is_empty() {
            self.message = Some(MISSING_KEY.to_string());
            None
        } else if is_dot_segment(&self.key_input) {
            self.message = Some(UNSUPPORTED_KEY.to_string());
            None
        } else {
            Some(self.key_input.clone())
        }
    }

    fn spawn<F, Fut>(&mut self, task: F)
    where
        F: FnOnce(mpsc::Sender<CacheEvent>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.pending += 1;
        tokio::spawn(task(self.events_tx.clone()));
    }

    /// Apply every result that has already arrived. Returns how many were
    /// applied, so the caller knows whether to redraw.
    pub fn check_background_tasks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next result and apply it.
    /// Returns false immediately when nothing is in flight.
    pub async fn wait_for_update(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: CacheEvent) {
        self.pending = self.pending.saturating_sub(1);
        match event {
            CacheEvent::Time(Ok(secs)) => match format_local_timestamp(secs) {
                Some(formatted) => self.time = Some(formatted),
                None => warn!(secs, "Server time out of range"),
            },
            CacheEvent::Time(Err(e)) => {
                warn!(error = %e, "Error fetching time");
            }
            CacheEvent::Stored(Ok(status)) => {
                self.message = Some(status.message);
                self.key_input.clear();
                self.value_input.clear();
            }
            CacheEvent::Stored(Err(e)) => {
                warn!(error = %e, "Failed to set cache entry");
                self.message = Some(SET_FAILED.to_string());
            }
            CacheEvent::Lookup(CacheLookup::Found(entry)) => {
                self.entry = Some(entry);
                self.message = None;
            }
            CacheEvent::Lookup(CacheLookup::NotFound) => {
                self.entry = None;
                self.message = Some(KEY_NOT_FOUND.to_string());
            }
            CacheEvent::Lookup(CacheLookup::Failed(e)) => {
                warn!(error = %e, "Failed to fetch cache entry");
                self.message = Some(GET_FAILED.to_string());
            }
            CacheEvent::Deleted(Ok(deletion)) => {
                self.message = Some(match deletion {
                    CacheDeletion::Deleted(message) => message,
                    CacheDeletion::NotFound => KEY_NOT_FOUND.to_string(),
                });
                self.entry = None;
                self.key_input.clear();
            }
            CacheEvent::Deleted(Err(e)) => {
                warn!(error = %e, "Failed to delete cache entry");
                self.message = Some(DELETE_FAILED.to_string());
            }
        }
    }
}
