//! Utility functions for display formatting.

pub mod format;

pub use format::{
    format_created_at, format_local_timestamp, format_price, format_timestamp, truncate_string,
};
