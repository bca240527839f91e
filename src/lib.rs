//! # Policy Cache
//!
//! A thread-safe, capacity-bounded in-memory cache with pluggable eviction
//! and per-entry TTL.
//!
//! ## Features
//!
//! - **Two policies**: LRU (least recently used) and LFU (least frequently
//!   used, oldest entry first among ties), both O(1) per operation
//! - **TTL support**: expired entries are invisible immediately and reclaimed
//!   lazily on access, on demand, or by an optional background sweep
//! - **Event sink**: plug in a [`Logger`] to observe additions, updates,
//!   evictions, removals and expirations
//! - **Statistics**: hits, misses, evictions and more
//! - **Zero unsafe code**: lists are linked by arena index, not pointer
//!
//! ## Quick Start
//!
//! ```rust
//! use policy_cache::{Cache, Policy};
//! use std::time::Duration;
//!
//! let cache = Cache::new(Policy::Lru, 2).unwrap();
//! cache.put("a", 1);
//! cache.put("b", 2);
//!
//! // Reading "a" makes "b" the least recently used entry.
//! assert_eq!(cache.get("a"), Some(1));
//! cache.put("c", 3);
//! assert_eq!(cache.get("b"), None);
//!
//! cache.put_with_ttl("session", 4, Duration::from_secs(60));
//! println!("Hit rate: {:.1}%", cache.stats().hit_rate);
//! ```
//!
//! ## Background cleanup
//!
//! With [`CacheConfig::background_cleanup`] enabled, a Tokio task sweeps
//! expired entries on a fixed interval until [`Cache::shutdown`] is called
//! or the last handle is dropped:
//!
//! ```rust
//! use policy_cache::{Cache, CacheConfig, Policy};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = CacheConfig::new()
//!     .policy(Policy::Lfu)
//!     .capacity(1_000)
//!     .default_ttl(Duration::from_secs(30))
//!     .cleanup_interval(Duration::from_secs(5))
//!     .background_cleanup(true);
//!
//! let cache: Cache<String, String> = Cache::with_config(config).unwrap();
//! assert!(cache.is_sweeping());
//! cache.shutdown();
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logger;
pub mod policy;
pub mod stats;
pub mod sweeper;

pub use cache::Cache;
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use logger::{ConsoleLogger, Logger, TracingLogger};
pub use policy::Policy;
pub use stats::{CacheStats, StatsSnapshot};

pub(crate) mod ds;
pub(crate) mod entry;

// Server and client plumbing.
pub mod cli;
pub mod protocol;

pub use cli::{Cli, ClientCommand, ServerArgs};
pub use protocol::Request;
