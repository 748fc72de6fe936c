//! Data models for the remote services.
//!
//! - `User`, `NewUser`: records of the users collection
//! - `Product`, `NewProduct`: records of the products collection
//! - `CacheEntry`, `StatusMessage`, `ServerTime`: cache service payloads

pub mod cache;
pub mod product;
pub mod user;

pub use cache::{CacheEntry, ServerTime, StatusMessage};
pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
