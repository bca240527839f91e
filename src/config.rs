//! Configuration for the cache.
//!
//! This module provides a builder for the policy, capacity, TTL defaults and
//! the background sweep. Validation happens when the cache is built, see
//! [`Cache::with_config`](crate::Cache::with_config).

use std::time::Duration;

use crate::policy::Policy;

/// Default interval between background sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for creating a new cache instance.
///
/// ```
/// use policy_cache::{CacheConfig, Policy};
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .policy(Policy::Lfu)
///     .capacity(10_000)
///     .default_ttl(Duration::from_secs(300))
///     .build();
///
/// assert_eq!(config.get_capacity(), 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Eviction policy.
    pub(crate) policy: Policy,

    /// Maximum number of entries. Must be at least 1.
    pub(crate) capacity: usize,

    /// TTL used by `put`. `None` means entries don't expire by default.
    pub(crate) default_ttl: Option<Duration>,

    /// Whether a successful `get` pushes the deadline to `now + ttl`.
    pub(crate) sliding_expiration: bool,

    /// Interval for the background sweep of expired entries.
    pub(crate) cleanup_interval: Duration,

    /// Whether to run the background sweep at all.
    pub(crate) background_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Lru,
            capacity: 1024,
            default_ttl: None,
            sliding_expiration: false,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            background_cleanup: false,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the eviction policy.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the maximum number of entries.
    ///
    /// Zero is accepted here and rejected when the cache is built.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the TTL applied by `put`.
    ///
    /// Set to `Duration::ZERO` to disable the default TTL.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = if ttl.is_zero() { None } else { Some(ttl) };
        self
    }

    /// Refresh an entry's deadline on every hit.
    pub fn sliding_expiration(mut self, enabled: bool) -> Self {
        self.sliding_expiration = enabled;
        self
    }

    /// Set the interval of the background sweep.
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Enable or disable the background sweep.
    ///
    /// When enabled, the cache must be built inside a Tokio runtime. When
    /// disabled, expired entries are only removed on access or by
    /// `cleanup_expired`.
    pub fn background_cleanup(mut self, enabled: bool) -> Self {
        self.background_cleanup = enabled;
        self
    }

    /// Finish the builder.
    pub fn build(self) -> Self {
        self
    }

    pub fn get_policy(&self) -> Policy {
        self.policy
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    pub fn get_cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding_expiration
    }
}
