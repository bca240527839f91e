//! Frequency bucket chain for O(1) LFU.
//!
//! Buckets live in their own arena and are threaded, in strictly ascending
//! `count` order, onto an [`IntrusiveList`]. Each bucket owns a member list of
//! entry handles that share its count; members are pushed at the front, so the
//! back of a bucket is the entry least recently touched at that frequency.
//!
//! ```text
//!   min ──┐
//!         ▼
//!   [count=1] ◄──► [count=2] ◄──► [count=5]
//!    e4 e2 e9        e1             e3 e7
//!          ▲
//!          └─ eviction candidate (back of the min bucket)
//! ```
//!
//! Only counts with at least one member exist as buckets. The chain never
//! scans: every operation touches a bucket, its neighbour and the entry.

use crate::ds::list::{IntrusiveList, Linked, Links};
use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Bucket {
    count: u64,
    members: IntrusiveList,
    links: Links,
}

impl Linked for Bucket {
    fn links(&self) -> &Links {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

/// Ordered chain of frequency buckets with a live min-frequency reference.
#[derive(Debug, Default)]
pub struct BucketChain {
    buckets: SlotArena<Bucket>,
    chain: IntrusiveList,
    min: Option<SlotId>,
}

impl BucketChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live buckets.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Bucket holding the smallest live count; `None` only when empty.
    pub fn min(&self) -> Option<SlotId> {
        self.min
    }

    /// Access count shared by the members of `bucket`.
    pub fn count(&self, bucket: SlotId) -> u64 {
        self.bucket(bucket).count
    }

    /// Link a fresh entry at count 1 and return its bucket.
    pub fn insert<T: Linked>(&mut self, entries: &mut SlotArena<T>, entry: SlotId) -> SlotId {
        let first = match self.chain.front() {
            Some(front) if self.bucket(front).count == 1 => front,
            _ => {
                let id = self.alloc(1);
                self.chain.push_front(&mut self.buckets, id);
                id
            }
        };
        self.bucket_mut(first).members.push_front(entries, entry);
        self.min = Some(first);
        first
    }

    /// Move `entry` from `bucket` to the bucket for the next count, creating
    /// it when absent, and return the new bucket.
    pub fn promote<T: Linked>(
        &mut self,
        entries: &mut SlotArena<T>,
        entry: SlotId,
        bucket: SlotId,
    ) -> SlotId {
        let count = self.bucket(bucket).count;
        let next = match self.chain.next(&self.buckets, bucket) {
            Some(next) if self.bucket(next).count == count + 1 => next,
            _ => {
                let id = self.alloc(count + 1);
                self.chain.insert_after(&mut self.buckets, bucket, id);
                id
            }
        };

        self.detach(entries, entry, bucket);
        self.bucket_mut(next).members.push_front(entries, entry);
        next
    }

    /// Unlink `entry` from `bucket`, dropping the bucket if it empties.
    pub fn detach<T: Linked>(&mut self, entries: &mut SlotArena<T>, entry: SlotId, bucket: SlotId) {
        self.bucket_mut(bucket).members.remove(entries, entry);
        if !self.bucket(bucket).members.is_empty() {
            return;
        }

        if self.min == Some(bucket) {
            self.min = self.chain.next(&self.buckets, bucket);
        }
        self.chain.remove(&mut self.buckets, bucket);
        self.buckets.remove(bucket);
    }

    /// Oldest entry in the min-frequency bucket.
    ///
    /// # Panics
    /// If the min-frequency bucket exists but has no members. That state is
    /// unreachable unless the chain is corrupt.
    pub fn eviction_candidate(&self) -> Option<SlotId> {
        let min = self.min?;
        match self.bucket(min).members.back() {
            Some(entry) => Some(entry),
            None => panic!("min-frequency bucket {:?} is empty", min),
        }
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.chain = IntrusiveList::new();
        self.min = None;
    }

    /// Iterate `(count, members)` pairs from the lowest count upwards.
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (u64, &IntrusiveList)> + '_ {
        self.chain.iter(&self.buckets).map(move |id| {
            let bucket = self.bucket(id);
            (bucket.count, &bucket.members)
        })
    }

    /// Panic unless the chain is strictly ascending, every bucket is
    /// non-empty, `min` is the first bucket and each member reports its
    /// owning bucket through `bucket_of`. Returns the number of members.
    pub fn debug_validate<T: Linked>(
        &self,
        entries: &SlotArena<T>,
        bucket_of: impl Fn(&T) -> Option<SlotId>,
    ) -> usize {
        self.chain.debug_validate(&self.buckets);
        assert_eq!(self.chain.len(), self.buckets.len(), "orphan bucket");
        assert_eq!(self.min, self.chain.front(), "min does not point at the lowest bucket");

        let mut last = 0u64;
        let mut members = 0usize;
        for id in self.chain.iter(&self.buckets) {
            let bucket = self.bucket(id);
            assert!(bucket.count > last, "bucket counts are not strictly ascending");
            assert!(!bucket.members.is_empty(), "empty bucket {} in chain", bucket.count);
            bucket.members.debug_validate(entries);
            for entry in bucket.members.iter(entries) {
                let owner = entries.get(entry).and_then(&bucket_of);
                assert_eq!(owner, Some(id), "entry bucket reference is stale");
            }
            members += bucket.members.len();
            last = bucket.count;
        }
        members
    }

    fn alloc(&mut self, count: u64) -> SlotId {
        self.buckets.insert(Bucket {
            count,
            members: IntrusiveList::new(),
            links: Links::default(),
        })
    }

    fn bucket(&self, id: SlotId) -> &Bucket {
        match self.buckets.get(id) {
            Some(bucket) => bucket,
            None => panic!("stale bucket handle {:?}", id),
        }
    }

    fn bucket_mut(&mut self, id: SlotId) -> &mut Bucket {
        match self.buckets.get_mut(id) {
            Some(bucket) => bucket,
            None => panic!("stale bucket handle {:?}", id),
        }
    }
}
