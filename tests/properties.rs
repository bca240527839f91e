//! Property tests: random operation sequences checked against a naive model.

use policy_cache::{Cache, Policy};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u32),
    Get(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..10, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (0u8..10).prop_map(Op::Get),
        1 => (0u8..10).prop_map(Op::Remove),
    ]
}

/// Linear-scan reference. Each entry carries its access count and the tick
/// of its last touch; the victim is the smallest (count, tick) under LFU and
/// the smallest tick under LRU.
struct Model {
    policy: Policy,
    capacity: usize,
    tick: u64,
    entries: Vec<(u8, u32, u64, u64)>,
}

impl Model {
    fn new(policy: Policy, capacity: usize) -> Self {
        Self {
            policy,
            capacity,
            tick: 0,
            entries: Vec::new(),
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|e| e.0 == key)
    }

    fn touch(&mut self, idx: usize) {
        self.tick += 1;
        self.entries[idx].2 += 1;
        self.entries[idx].3 = self.tick;
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let idx = self.position(key)?;
        self.touch(idx);
        Some(self.entries[idx].1)
    }

    fn put(&mut self, key: u8, value: u32) {
        if let Some(idx) = self.position(key) {
            self.entries[idx].1 = value;
            self.touch(idx);
            return;
        }
        if self.entries.len() == self.capacity {
            let policy = self.policy;
            let victim = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| match policy {
                    Policy::Lru => (0, e.3),
                    Policy::Lfu => (e.2, e.3),
                })
                .map(|(idx, _)| idx)
                .unwrap();
            self.entries.remove(victim);
        }
        self.tick += 1;
        self.entries.push((key, value, 1, self.tick));
    }

    fn remove(&mut self, key: u8) -> bool {
        match self.position(key) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }
}

fn run(policy: Policy, capacity: usize, ops: &[Op]) -> Result<(), TestCaseError> {
    let cache = Cache::new(policy, capacity).unwrap();
    let mut model = Model::new(policy, capacity);

    for op in ops {
        match *op {
            Op::Put(k, v) => {
                cache.put(k, v);
                model.put(k, v);
            }
            Op::Get(k) => prop_assert_eq!(cache.get(&k), model.get(k)),
            Op::Remove(k) => prop_assert_eq!(cache.remove(&k), model.remove(k)),
        }
        prop_assert!(cache.len() <= capacity);
        prop_assert_eq!(cache.len(), model.entries.len());
    }

    cache.debug_validate_invariants();
    for (key, value, count, _) in &model.entries {
        prop_assert_eq!(cache.peek(key), Some(*value));
        if policy == Policy::Lfu {
            prop_assert_eq!(cache.frequency(key), Some(*count));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn lru_matches_model(capacity in 1usize..6, ops in prop::collection::vec(op(), 0..200)) {
        run(Policy::Lru, capacity, &ops)?;
    }

    #[test]
    fn lfu_matches_model(capacity in 1usize..6, ops in prop::collection::vec(op(), 0..200)) {
        run(Policy::Lfu, capacity, &ops)?;
    }
}
