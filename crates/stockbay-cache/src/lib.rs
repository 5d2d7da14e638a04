//! # StockBay Cache
//!
//! In-process TTL caching for the StockBay API.
//!
//! This crate provides:
//! - A concurrent in-memory key/value store with per-entry expiry
//! - Lazy eviction on read plus a periodic background sweep
//! - Prefix-based bulk invalidation for resource collections
//! - Deterministic cache key generation from query parameters
//! - Cache configuration from environment variables
//!
//! The cache is a best-effort read accelerator, never a source of truth:
//! it is not durable and not shared across processes. Construct one
//! [`MemoryCache`] at startup and hand clones to whoever needs it. Stop
//! the sweeper on shutdown.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use stockbay_cache::{CacheConfig, MemoryCache};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CacheConfig::from_env();
//!     let cache = MemoryCache::new(Duration::from_secs(config.default_ttl_seconds));
//!     cache.start_sweeper(Duration::from_secs(config.sweep_interval_seconds)).await;
//!
//!     // Set a value
//!     cache.set("key", &my_value).await.unwrap();
//!
//!     // Get a value
//!     let value: Option<MyType> = cache.get("key").await;
//!
//!     cache.stop_sweeper().await;
//! }
//! ```

pub mod config;
pub mod keys;
pub mod store;

pub use config::CacheConfig;
pub use keys::{generate, invalidate, prefixes};
pub use store::{CacheError, MemoryCache};
