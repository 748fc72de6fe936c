//! Core library for servicedeck.
//!
//! Keeps local state in step with the remote users, products and cache
//! services:
//!
//! - `api`: HTTP client for the services and the status-code mapping
//! - `models`: wire types for users, products and cache entries
//! - `config`: endpoint configuration (file, environment, defaults)
//! - `sync`: the collection synchronizer and the scalar cache client
//! - `utils`: display formatting helpers

pub mod api;
pub mod config;
pub mod models;
pub mod sync;
pub mod utils;

pub use api::{ApiClient, ApiError, CacheDeletion, CacheLookup};
pub use config::{Config, Endpoints};
pub use sync::{CacheClient, CollectionSync, LoadState, SyncError};
