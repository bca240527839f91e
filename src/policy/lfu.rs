//! Least Frequently Used engine.
//!
//! Entries are grouped by access count in a [`BucketChain`]. Every get or
//! update moves an entry exactly one bucket up; eviction takes the oldest
//! member of the min-frequency bucket. All of it is O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use crate::ds::buckets::BucketChain;
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::entry::{Entry, Expiry};

#[derive(Debug)]
pub struct LfuEngine<K, V> {
    capacity: usize,
    entries: SlotArena<Entry<K, V>>,
    index: HashMap<K, SlotId>,
    chain: BucketChain,
}

impl<K, V> LfuEngine<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: SlotArena::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            chain: BucketChain::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied()
    }

    pub fn entry(&self, id: SlotId) -> Option<&Entry<K, V>> {
        self.entries.get(id)
    }

    pub fn entry_mut(&mut self, id: SlotId) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(id)
    }

    /// Access count of the entry at `id`.
    pub fn frequency(&self, id: SlotId) -> Option<u64> {
        let bucket = self.entries.get(id)?.bucket?;
        Some(self.chain.count(bucket))
    }

    /// Count one more access of `id`.
    pub fn touch(&mut self, id: SlotId) {
        let bucket = self.bucket_of(id);
        let next = self.chain.promote(&mut self.entries, id, bucket);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.bucket = Some(next);
        }
    }

    /// Insert an absent key at count 1, evicting the least frequently used
    /// entry first when full. Returns the evicted entry.
    pub fn insert(&mut self, key: K, value: V, expiry: Expiry) -> Option<Entry<K, V>> {
        debug_assert!(!self.index.contains_key(&key));

        let evicted = if self.index.len() >= self.capacity {
            match self.chain.eviction_candidate() {
                Some(victim) => self.remove_id(victim),
                None => panic!("lfu: {} entries indexed but no bucket to evict from", self.len()),
            }
        } else {
            None
        };

        let id = self.entries.insert(Entry::new(key.clone(), value, expiry));
        let bucket = self.chain.insert(&mut self.entries, id);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.bucket = Some(bucket);
        }
        self.index.insert(key, id);
        evicted
    }

    /// Detach and return the entry at `id`.
    pub fn remove_id(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        let bucket = self.entries.get(id)?.bucket?;
        self.chain.detach(&mut self.entries, id, bucket);
        let mut entry = self.entries.remove(id)?;
        entry.bucket = None;
        self.index.remove(&entry.key);
        Some(entry)
    }

    /// Handles of every entry whose deadline has passed.
    pub fn expired(&self, now: Instant) -> Vec<SlotId> {
        self.index
            .values()
            .copied()
            .filter(|id| self.entries.get(*id).map_or(false, |e| e.is_expired_at(now)))
            .collect()
    }

    /// `(count, keys)` per bucket, lowest count first, keys newest first.
    #[cfg(test)]
    pub fn buckets(&self) -> Vec<(u64, Vec<K>)> {
        self.chain
            .iter()
            .map(|(count, members)| {
                let keys = members
                    .iter(&self.entries)
                    .filter_map(|id| self.entries.get(id).map(|e| e.key.clone()))
                    .collect();
                (count, keys)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.chain.clear();
    }

    pub fn debug_validate(&self) {
        assert!(self.index.len() <= self.capacity, "size exceeds capacity");
        assert_eq!(self.index.len(), self.entries.len(), "index and arena disagree");
        let linked = self.chain.debug_validate(&self.entries, |entry| entry.bucket);
        assert_eq!(linked, self.index.len(), "bucket membership and index disagree");
        for (key, id) in &self.index {
            let entry = match self.entries.get(*id) {
                Some(entry) => entry,
                None => panic!("index references free slot {:?}", id),
            };
            assert!(entry.key == *key, "index key does not match entry key");
            assert!(entry.bucket.is_some(), "indexed entry has no bucket");
        }
        if self.index.is_empty() {
            assert!(self.chain.min().is_none());
        }
    }

    fn bucket_of(&self, id: SlotId) -> SlotId {
        match self.entries.get(id).and_then(|e| e.bucket) {
            Some(bucket) => bucket,
            None => panic!("lfu: entry {:?} is not in any bucket", id),
        }
    }
}
