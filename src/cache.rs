//! The main cache interface.
//!
//! `Cache` is the facade over the policy engines. One `RwLock` guards the
//! engine (hash index, entry arena, list or bucket chain, TTL deadlines) as a
//! single unit. Everything that can promote or reclaim an entry takes the
//! write half; only non-promoting reads (`contains`, `peek`, `len`, ...) take
//! the read half. Event sinks run after the guard is dropped.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::config::CacheConfig;
use crate::entry::Expiry;
use crate::error::{CacheError, CacheResult};
use crate::logger::{self, Logger};
use crate::policy::{Engine, Policy};
use crate::stats::{CacheStats, StatsSnapshot};
use crate::sweeper::Sweeper;

/// A thread-safe, capacity-bounded cache with LRU or LFU eviction and
/// optional per-entry TTL.
///
/// Cloning a `Cache` creates a new handle to the same entries.
///
/// # Example
/// ```
/// use policy_cache::{Cache, Policy};
/// use std::time::Duration;
///
/// let cache = Cache::new(Policy::Lfu, 2).unwrap();
/// cache.put(1, "A");
/// cache.put(2, "B");
/// assert_eq!(cache.get(&1), Some("A"));
///
/// // 2 has the lowest access count, so it makes room for 3.
/// cache.put(3, "C");
/// assert_eq!(cache.get(&2), None);
///
/// cache.put_with_ttl(4, "D", Duration::from_secs(30));
/// ```
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
}

struct Shared<K, V> {
    engine: RwLock<Engine<K, V>>,
    default_ttl: Option<Duration>,
    sliding: bool,
    stats: CacheStats,
    logger: RwLock<Option<Arc<dyn Logger>>>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache with the given policy and capacity, no default TTL and
    /// no background sweep.
    ///
    /// # Errors
    /// `CacheError::InvalidCapacity` if `capacity` is zero.
    pub fn new(policy: Policy, capacity: usize) -> CacheResult<Self> {
        Self::with_config(CacheConfig::new().policy(policy).capacity(capacity))
    }

    /// Create a cache from a full configuration.
    ///
    /// # Errors
    /// - `CacheError::InvalidCapacity` if the capacity is zero.
    /// - `CacheError::InvalidConfig` if background cleanup is enabled with a
    ///   zero interval or outside a Tokio runtime.
    pub fn with_config(config: CacheConfig) -> CacheResult<Self> {
        if config.capacity == 0 {
            return Err(CacheError::InvalidCapacity(config.capacity));
        }

        let shared = Arc::new(Shared {
            engine: RwLock::new(Engine::new(config.policy, config.capacity)),
            default_ttl: config.default_ttl,
            sliding: config.sliding_expiration,
            stats: CacheStats::new(),
            logger: RwLock::new(None),
            sweeper: Mutex::new(None),
        });

        if config.background_cleanup {
            let weak = Arc::downgrade(&shared);
            let sweeper = Sweeper::spawn(config.cleanup_interval, move || match weak.upgrade() {
                Some(shared) => {
                    let removed = shared.purge_expired();
                    if removed > 0 {
                        tracing::debug!(removed, "ttl sweep reclaimed entries");
                    }
                    true
                }
                None => false,
            })?;
            if let Ok(mut slot) = shared.sweeper.lock() {
                *slot = Some(sweeper);
            }
        }

        Ok(Self { shared })
    }

    /// Get a value, promoting the entry per policy.
    ///
    /// Returns `None` if the key is absent or expired; an expired entry is
    /// reclaimed on the spot.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let shared = &*self.shared;
        let now = Instant::now();
        let mut events = shared.events();

        let value = {
            let mut engine = shared.write()?;
            match engine.lookup(key) {
                None => None,
                Some(id) => {
                    let expired = engine.entry(id).map_or(true, |e| e.is_expired_at(now));
                    if expired {
                        if let Some(entry) = engine.remove_id(id) {
                            shared.stats.record_expirations(1);
                            events.push(|| format!("key {:?} expired", entry.key));
                        }
                        shared.stats.set_size(engine.len());
                        None
                    } else {
                        engine.touch(id);
                        engine.entry_mut(id).map(|entry| {
                            if shared.sliding {
                                entry.expiry.refresh(now);
                            }
                            events.push(|| format!("key {:?} retrieved", entry.key));
                            entry.value.clone()
                        })
                    }
                }
            }
        };

        match value {
            Some(_) => shared.stats.record_hit(),
            None => shared.stats.record_miss(),
        }
        shared.emit(events);
        value
    }

    /// Insert or overwrite a value using the configured default TTL.
    pub fn put(&self, key: K, value: V) {
        self.store(key, value, self.shared.default_ttl);
    }

    /// Insert or overwrite a value that expires `ttl` from now.
    ///
    /// `Duration::ZERO` means the entry never expires. Overwriting an entry
    /// promotes it per policy and keeps the later of its current deadline
    /// and `now + ttl`; a zero `ttl` clears the deadline. A new key in a
    /// full cache evicts one entry first.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.store(key, value, Some(ttl));
    }

    /// Remove a key. Returns `true` if it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let shared = &*self.shared;
        let mut events = shared.events();

        let removed = {
            let Some(mut engine) = shared.write() else {
                return false;
            };
            let removed = engine.lookup(key).and_then(|id| engine.remove_id(id));
            if let Some(entry) = &removed {
                shared.stats.record_removal();
                shared.stats.set_size(engine.len());
                events.push(|| format!("key {:?} removed", entry.key));
            }
            removed.is_some()
        };

        shared.emit(events);
        removed
    }

    /// Check for a live entry without promoting it.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek_with(key, |_| ()).is_some()
    }

    /// Read a live value without promoting it or refreshing its TTL.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek_with(key, V::clone)
    }

    /// Access count of a live entry under LFU. Always `None` under LRU.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let engine = self.shared.read()?;
        let id = engine.lookup(key)?;
        if engine.entry(id)?.is_expired_at(Instant::now()) {
            return None;
        }
        engine.frequency(id)
    }

    /// Number of entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.shared.read().map_or(0, |engine| engine.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.read().map_or(0, |engine| engine.capacity())
    }

    pub fn policy(&self) -> Policy {
        self.shared
            .read()
            .map_or(Policy::default(), |engine| engine.policy())
    }

    /// Remove every entry.
    pub fn clear(&self) {
        if let Some(mut engine) = self.shared.write() {
            engine.clear();
            self.shared.stats.set_size(0);
        }
    }

    /// Reclaim every expired entry now. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.shared.purge_expired()
    }

    /// Install the event sink.
    pub fn set_logger(&self, sink: Arc<dyn Logger>) {
        if let Ok(mut slot) = self.shared.logger.write() {
            *slot = Some(sink);
        }
    }

    /// Remove the event sink.
    pub fn clear_logger(&self) {
        if let Ok(mut slot) = self.shared.logger.write() {
            *slot = None;
        }
    }

    /// Stop the background sweep. Safe to call more than once; has no
    /// effect on in-flight operations.
    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.shared.sweeper.lock() {
            if let Some(sweeper) = slot.as_mut() {
                sweeper.stop();
            }
        }
    }

    /// `true` while the background sweep is active.
    pub fn is_sweeping(&self) -> bool {
        self.shared
            .sweeper
            .lock()
            .map_or(false, |slot| slot.as_ref().map_or(false, Sweeper::is_running))
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Check every structural invariant of the active engine.
    ///
    /// # Panics
    /// If the hash index and the list or bucket membership disagree, the size
    /// exceeds capacity, or the LFU chain is out of order.
    pub fn debug_validate_invariants(&self) {
        if let Some(engine) = self.shared.read() {
            engine.debug_validate();
        }
    }

    fn store(&self, key: K, value: V, ttl: Option<Duration>) {
        let shared = &*self.shared;
        let now = Instant::now();
        let expiry = Expiry::from_ttl(ttl, now);
        let mut events = shared.events();

        {
            let Some(mut engine) = shared.write() else {
                return;
            };

            // A stale entry is reclaimed and the key starts over as new.
            if let Some(id) = engine.lookup(&key) {
                if engine.entry(id).map_or(false, |e| e.is_expired_at(now)) {
                    if engine.remove_id(id).is_some() {
                        shared.stats.record_expirations(1);
                        events.push(|| format!("key {:?} expired", key));
                    }
                }
            }

            match engine.lookup(&key) {
                Some(id) => {
                    if let Some(entry) = engine.entry_mut(id) {
                        entry.value = value;
                        entry.expiry.extend(ttl.unwrap_or(Duration::ZERO), now);
                    }
                    engine.touch(id);
                    shared.stats.record_update();
                    events.push(|| format!("key {:?} updated", key));
                }
                None => {
                    let label = events.describe(&key);
                    if let Some(evicted) = engine.insert(key, value, expiry) {
                        shared.stats.record_eviction();
                        events.push(|| format!("key {:?} evicted due to capacity", evicted.key));
                    }
                    shared.stats.record_insert();
                    if let Some(label) = label {
                        events.push(|| format!("key {} added", label));
                    }
                }
            }
            shared.stats.set_size(engine.len());
        }

        shared.emit(events);
    }

    fn peek_with<Q, R>(&self, key: &Q, f: impl FnOnce(&V) -> R) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let engine = self.shared.read()?;
        let entry = engine.entry(engine.lookup(key)?)?;
        if entry.is_expired_at(Instant::now()) {
            return None;
        }
        Some(f(entry.value()))
    }
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn read(&self) -> Option<RwLockReadGuard<'_, Engine<K, V>>> {
        match self.engine.read() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::error!("cache lock poisoned; treating read as a miss");
                None
            }
        }
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, Engine<K, V>>> {
        match self.engine.write() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::error!("cache lock poisoned; dropping write");
                None
            }
        }
    }

    fn purge_expired(&self) -> usize {
        let mut events = self.events();
        let removed = {
            let Some(mut engine) = self.write() else {
                return 0;
            };
            let purged = engine.purge_expired(Instant::now());
            for entry in &purged {
                events.push(|| format!("key {:?} expired", entry.key));
            }
            self.stats.record_expirations(purged.len() as u64);
            self.stats.set_size(engine.len());
            purged.len()
        };
        self.emit(events);
        removed
    }

    fn events(&self) -> Events {
        let sink = self.logger.read().ok().and_then(|slot| slot.clone());
        Events {
            sink,
            messages: Vec::new(),
        }
    }

    fn emit(&self, events: Events) {
        if let Some(sink) = &events.sink {
            logger::emit(sink.as_ref(), &events.messages);
        }
    }
}

/// Messages gathered under the lock and delivered after it is released.
/// Nothing is formatted when no sink is installed.
struct Events {
    sink: Option<Arc<dyn Logger>>,
    messages: Vec<String>,
}

impl Events {
    fn push(&mut self, message: impl FnOnce() -> String) {
        if self.sink.is_some() {
            self.messages.push(message());
        }
    }

    fn describe<K: fmt::Debug>(&self, key: &K) -> Option<String> {
        self.sink.as_ref().map(|_| format!("{:?}", key))
    }
}

impl<K, V> fmt::Debug for Cache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy())
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("sweeping", &self.is_sweeping())
            .finish()
    }
}
