//! REST API client module for the users, products and cache services.
//!
//! This module provides the `ApiClient` for listing and creating collection
//! records, reading the service clock, and the set/get/delete operations of
//! the key/value cache. Requests carry JSON bodies and no authentication.

pub mod client;
pub mod error;

pub use client::{is_dot_segment, ApiClient, CacheDeletion, CacheLookup};
pub use error::{ApiError, ApiResult};
