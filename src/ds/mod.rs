//! Index-linked data structures backing the policy engines.
//!
//! Entries live in a [`SlotArena`](slot_arena::SlotArena) and are linked by
//! [`SlotId`](slot_arena::SlotId) rather than by pointer, so recency lists
//! and frequency buckets are plain safe Rust.

pub(crate) mod buckets;
pub(crate) mod list;
pub(crate) mod slot_arena;
