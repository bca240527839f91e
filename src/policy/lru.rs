//! Least Recently Used engine.
//!
//! One intrusive list in recency order: front is the entry touched last,
//! back is the eviction candidate.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use crate::ds::list::IntrusiveList;
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::entry::{Entry, Expiry};

#[derive(Debug)]
pub struct LruEngine<K, V> {
    capacity: usize,
    entries: SlotArena<Entry<K, V>>,
    index: HashMap<K, SlotId>,
    list: IntrusiveList,
}

impl<K, V> LruEngine<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: SlotArena::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            list: IntrusiveList::new(),
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

    /// Mark `id` as most recently used.
    pub fn touch(&mut self, id: SlotId) {
        self.list.move_to_front(&mut self.entries, id);
    }

    /// Insert an absent key at the front, evicting the back entry first when
    /// full. Returns the evicted entry.
    pub fn insert(&mut self, key: K, value: V, expiry: Expiry) -> Option<Entry<K, V>> {
        debug_assert!(!self.index.contains_key(&key));

        let evicted = if self.index.len() >= self.capacity {
            match self.list.back() {
                Some(back) => self.remove_id(back),
                None => panic!("lru: {} entries indexed but recency list is empty", self.len()),
            }
        } else {
            None
        };

        let id = self.entries.insert(Entry::new(key.clone(), value, expiry));
        self.list.push_front(&mut self.entries, id);
        self.index.insert(key, id);
        evicted
    }

    /// Detach and return the entry at `id`.
    pub fn remove_id(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        if !self.entries.contains(id) {
            return None;
        }
        self.list.remove(&mut self.entries, id);
        let entry = self.entries.remove(id)?;
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

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub fn keys(&self) -> Vec<K> {
        self.list
            .iter(&self.entries)
            .filter_map(|id| self.entries.get(id).map(|e| e.key.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.list = IntrusiveList::new();
    }

    pub fn debug_validate(&self) {
        assert!(self.index.len() <= self.capacity, "size exceeds capacity");
        assert_eq!(self.index.len(), self.entries.len(), "index and arena disagree");
        self.list.debug_validate(&self.entries);
        assert_eq!(self.list.len(), self.index.len(), "list and index disagree");
        for id in self.list.iter(&self.entries) {
            let key = match self.entries.get(id) {
                Some(entry) => &entry.key,
                None => panic!("list references free slot {:?}", id),
            };
            assert_eq!(self.index.get(key), Some(&id), "list entry missing from index");
        }
    }
}
