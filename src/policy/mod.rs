//! Eviction policies.
//!
//! Exactly two policies exist, so they are a closed enum rather than a trait
//! object: [`Policy`] names the kind, and the crate-private `Engine` holds
//! the state for whichever one was chosen.

pub(crate) mod lfu;
pub(crate) mod lru;

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::time::Instant;

use crate::ds::slot_arena::SlotId;
use crate::entry::{Entry, Expiry};
use crate::error::CacheError;

use lfu::LfuEngine;
use lru::LruEngine;

/// Eviction policy applied when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    /// Evict the entry that was read or written least recently.
    #[default]
    Lru,
    /// Evict the entry with the fewest accesses; among equals, the one
    /// touched least recently.
    Lfu,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Lru => "lru",
            Policy::Lfu => "lfu",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = CacheError;

    /// Parse a policy name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Policy::Lru),
            "lfu" => Ok(Policy::Lfu),
            _ => Err(CacheError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Policy state: hash index, entry arena and ordering structure.
#[derive(Debug)]
pub(crate) enum Engine<K, V> {
    Lru(LruEngine<K, V>),
    Lfu(LfuEngine<K, V>),
}

macro_rules! dispatch {
    ($engine:expr, $inner:ident => $body:expr) => {
        match $engine {
            Engine::Lru($inner) => $body,
            Engine::Lfu($inner) => $body,
        }
    };
}

impl<K, V> Engine<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(policy: Policy, capacity: usize) -> Self {
        match policy {
            Policy::Lru => Engine::Lru(LruEngine::new(capacity)),
            Policy::Lfu => Engine::Lfu(LfuEngine::new(capacity)),
        }
    }

    pub fn policy(&self) -> Policy {
        match self {
            Engine::Lru(_) => Policy::Lru,
            Engine::Lfu(_) => Policy::Lfu,
        }
    }

    pub fn len(&self) -> usize {
        dispatch!(self, e => e.len())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, e => e.capacity())
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        dispatch!(self, e => e.lookup(key))
    }

    pub fn entry(&self, id: SlotId) -> Option<&Entry<K, V>> {
        dispatch!(self, e => e.entry(id))
    }

    pub fn entry_mut(&mut self, id: SlotId) -> Option<&mut Entry<K, V>> {
        dispatch!(self, e => e.entry_mut(id))
    }

    /// Promote `id` per policy.
    pub fn touch(&mut self, id: SlotId) {
        dispatch!(self, e => e.touch(id))
    }

    pub fn insert(&mut self, key: K, value: V, expiry: Expiry) -> Option<Entry<K, V>> {
        dispatch!(self, e => e.insert(key, value, expiry))
    }

    pub fn remove_id(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        dispatch!(self, e => e.remove_id(id))
    }

    /// Access count under LFU; `None` under LRU.
    pub fn frequency(&self, id: SlotId) -> Option<u64> {
        match self {
            Engine::Lru(_) => None,
            Engine::Lfu(e) => e.frequency(id),
        }
    }

    /// Remove every entry whose deadline is at or before `now`.
    pub fn purge_expired(&mut self, now: Instant) -> Vec<Entry<K, V>> {
        let expired = dispatch!(&*self, e => e.expired(now));
        expired
            .into_iter()
            .filter_map(|id| self.remove_id(id))
            .collect()
    }

    pub fn clear(&mut self) {
        dispatch!(self, e => e.clear())
    }

    pub fn debug_validate(&self) {
        dispatch!(self, e => e.debug_validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("lru".parse::<Policy>().unwrap(), Policy::Lru);
        assert_eq!("LFU".parse::<Policy>().unwrap(), Policy::Lfu);
        assert!(matches!(
            "arc".parse::<Policy>(),
            Err(CacheError::UnknownPolicy(name)) if name == "arc"
        ));
    }

    #[test]
    fn test_policy_display_round_trip() {
        for policy in [Policy::Lru, Policy::Lfu] {
            assert_eq!(policy.to_string().parse::<Policy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_engine_reports_policy() {
        let lru: Engine<u8, u8> = Engine::new(Policy::Lru, 1);
        let lfu: Engine<u8, u8> = Engine::new(Policy::Lfu, 1);
        assert_eq!(lru.policy(), Policy::Lru);
        assert_eq!(lfu.policy(), Policy::Lfu);
    }

    #[test]
    fn test_purge_expired_both_policies() {
        for policy in [Policy::Lru, Policy::Lfu] {
            let mut engine = Engine::new(policy, 8);
            let now = Instant::now();
            engine.insert(1, "short", Expiry::after(Duration::from_millis(10), now));
            engine.insert(2, "forever", Expiry::NEVER);
            engine.insert(3, "long", Expiry::after(Duration::from_secs(60), now));

            let purged = engine.purge_expired(now + Duration::from_secs(1));
            let keys: Vec<_> = purged.into_iter().map(|e| e.key).collect();
            assert_eq!(keys, vec![1]);
            assert_eq!(engine.len(), 2);
            engine.debug_validate();
        }
    }

    #[test]
    fn test_frequency_only_under_lfu() {
        let mut lru = Engine::new(Policy::Lru, 2);
        lru.insert("a", 1, Expiry::NEVER);
        let id = lru.lookup("a").unwrap();
        assert_eq!(lru.frequency(id), None);

        let mut lfu = Engine::new(Policy::Lfu, 2);
        lfu.insert("a", 1, Expiry::NEVER);
        let id = lfu.lookup("a").unwrap();
        lfu.touch(id);
        assert_eq!(lfu.frequency(id), Some(2));
    }
}
