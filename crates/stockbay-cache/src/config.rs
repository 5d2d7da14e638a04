//! Cache configuration.
//!
//! This module provides configuration for the in-memory cache
//! loaded from environment variables.

use std::env;

/// Cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_TTL_SECONDS`: Default TTL for cached items in seconds (default: `300`)
/// - `CACHE_SWEEP_INTERVAL_SECONDS`: How often the background sweep evicts
///   expired entries (default: `600`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Default time-to-live for cached items in seconds.
    pub default_ttl_seconds: u64,

    /// Interval between background sweeps of expired entries.
    pub sweep_interval_seconds: u64,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    ///
    /// # Defaults
    ///
    /// - `CACHE_TTL_SECONDS`: `300` (5 minutes)
    /// - `CACHE_SWEEP_INTERVAL_SECONDS`: `600` (10 minutes)
    pub fn from_env() -> Self {
        Self {
            default_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            sweep_interval_seconds: env::var("CACHE_SWEEP_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 300,
            sweep_interval_seconds: 600,
        }
    }
}
