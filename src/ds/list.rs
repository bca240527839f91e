//! Intrusive doubly linked list over a [`SlotArena`].
//!
//! The list does not own its nodes. Nodes live in an arena and carry their own
//! [`Links`]; the list only records the two ends and its length. Several lists
//! can thread through the same arena (one per LFU frequency bucket), and the
//! bucket chain itself is an `IntrusiveList` over the bucket arena.
//!
//! ```text
//!   head ─► [id_3] ◄──► [id_1] ◄──► [id_7] ◄── tail
//!           front                    back
//!           (most recently touched)  (eviction candidate)
//! ```
//!
//! `None` at either end plays the role of a sentinel: `back()` on an empty
//! list is `None`, never a placeholder node.
//!
//! All operations are O(1) except iteration and `debug_validate`.

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Neighbour handles embedded in every list node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Links {
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// A value that can be threaded onto an [`IntrusiveList`].
pub trait Linked {
    fn links(&self) -> &Links;
    fn links_mut(&mut self) -> &mut Links;
}

/// Ends and length of a list whose nodes live in an external arena.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IntrusiveList {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl IntrusiveList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently pushed node.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Last real node, or `None` when empty.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Node following `id`, if any.
    pub fn next<T: Linked>(&self, arena: &SlotArena<T>, id: SlotId) -> Option<SlotId> {
        node(arena, id).links().next
    }

    /// Link an unlinked node at the front.
    pub fn push_front<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        debug_assert_eq!(*node(arena, id).links(), Links::default());

        let old_head = self.head;
        *node_mut(arena, id).links_mut() = Links {
            prev: None,
            next: old_head,
        };
        match old_head {
            Some(head) => node_mut(arena, head).links_mut().prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Link an unlinked node directly after `anchor`, which must be in this list.
    pub fn insert_after<T: Linked>(&mut self, arena: &mut SlotArena<T>, anchor: SlotId, id: SlotId) {
        debug_assert_eq!(*node(arena, id).links(), Links::default());

        let after = node(arena, anchor).links().next;
        *node_mut(arena, id).links_mut() = Links {
            prev: Some(anchor),
            next: after,
        };
        node_mut(arena, anchor).links_mut().next = Some(id);
        match after {
            Some(next) => node_mut(arena, next).links_mut().prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
    }

    /// Unlink `id`. The caller guarantees `id` is currently linked into this
    /// list; removing the same node twice corrupts the length.
    pub fn remove<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        debug_assert!(self.len > 0, "remove from empty list");

        let Links { prev, next } = *node(arena, id).links();
        match prev {
            Some(prev) => node_mut(arena, prev).links_mut().next = next,
            None => {
                debug_assert_eq!(self.head, Some(id), "node is not linked");
                self.head = next;
            }
        }
        match next {
            Some(next) => node_mut(arena, next).links_mut().prev = prev,
            None => self.tail = prev,
        }
        *node_mut(arena, id).links_mut() = Links::default();
        self.len -= 1;
    }

    /// Move a linked node to the front.
    pub fn move_to_front<T: Linked>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        if self.head == Some(id) {
            return;
        }
        self.remove(arena, id);
        self.push_front(arena, id);
    }

    /// Iterate node handles from front to back.
    pub fn iter<'a, T: Linked>(&self, arena: &'a SlotArena<T>) -> Iter<'a, T> {
        Iter {
            arena,
            current: self.head,
        }
    }

    /// Panic if the links reachable from `head` disagree with `tail` or `len`.
    pub fn debug_validate<T: Linked>(&self, arena: &SlotArena<T>) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none() && self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let links = node(arena, id).links();
            assert_eq!(links.prev, prev, "broken prev link at {:?}", id);
            if links.next.is_none() {
                assert_eq!(self.tail, Some(id), "tail does not match last node");
            }
            count += 1;
            assert!(count <= self.len, "list longer than its length");
            prev = Some(id);
            current = links.next;
        }
        assert_eq!(count, self.len);
    }
}

/// Front-to-back iterator over node handles.
pub struct Iter<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
}

impl<'a, T: Linked> Iterator for Iter<'a, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<SlotId> {
        let id = self.current?;
        self.current = node(self.arena, id).links().next;
        Some(id)
    }
}

fn node<T>(arena: &SlotArena<T>, id: SlotId) -> &T {
    match arena.get(id) {
        Some(node) => node,
        None => panic!("intrusive list references free slot {:?}", id),
    }
}

fn node_mut<T>(arena: &mut SlotArena<T>, id: SlotId) -> &mut T {
    match arena.get_mut(id) {
        Some(node) => node,
        None => panic!("intrusive list references free slot {:?}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Node {
        links: Links,
        value: u32,
    }

    impl Linked for Node {
        fn links(&self) -> &Links {
            &self.links
        }

        fn links_mut(&mut self) -> &mut Links {
            &mut self.links
        }
    }

    fn alloc(arena: &mut SlotArena<Node>, value: u32) -> SlotId {
        arena.insert(Node {
            links: Links::default(),
            value,
        })
    }

    fn values(list: &IntrusiveList, arena: &SlotArena<Node>) -> Vec<u32> {
        list.iter(arena)
            .map(|id| arena.get(id).map(|n| n.value).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_list_has_no_back() {
        let list = IntrusiveList::new();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new();
        for v in 1..=3 {
            let id = alloc(&mut arena, v);
            list.push_front(&mut arena, id);
        }

        assert_eq!(values(&list, &arena), vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
        let back = list.back().unwrap();
        assert_eq!(arena.get(back).unwrap().value, 1);
        list.debug_validate(&arena);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new();
        let ids: Vec<_> = (1..=5)
            .map(|v| {
                let id = alloc(&mut arena, v);
                list.push_front(&mut arena, id);
                id
            })
            .collect();

        list.remove(&mut arena, ids[4]); // head
        list.remove(&mut arena, ids[2]); // middle
        list.remove(&mut arena, ids[0]); // tail
        assert_eq!(values(&list, &arena), vec![4, 2]);
        list.debug_validate(&arena);

        list.remove(&mut arena, ids[3]);
        list.remove(&mut arena, ids[1]);
        assert!(list.is_empty());
        assert_eq!(list.back(), None);
        list.debug_validate(&arena);
    }

    #[test]
    fn test_move_to_front() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new();
        let a = alloc(&mut arena, 1);
        let b = alloc(&mut arena, 2);
        let c = alloc(&mut arena, 3);
        list.push_front(&mut arena, a);
        list.push_front(&mut arena, b);
        list.push_front(&mut arena, c);

        list.move_to_front(&mut arena, a);
        assert_eq!(values(&list, &arena), vec![1, 3, 2]);

        // Already at the front.
        list.move_to_front(&mut arena, a);
        assert_eq!(values(&list, &arena), vec![1, 3, 2]);
        list.debug_validate(&arena);
    }

    #[test]
    fn test_insert_after() {
        let mut arena = SlotArena::new();
        let mut list = IntrusiveList::new();
        let a = alloc(&mut arena, 1);
        let c = alloc(&mut arena, 3);
        list.push_front(&mut arena, c);
        list.push_front(&mut arena, a);

        let b = alloc(&mut arena, 2);
        list.insert_after(&mut arena, a, b);
        let d = alloc(&mut arena, 4);
        list.insert_after(&mut arena, c, d);

        assert_eq!(values(&list, &arena), vec![1, 2, 3, 4]);
        assert_eq!(list.back(), Some(d));
        assert_eq!(list.next(&arena, b), Some(c));
        list.debug_validate(&arena);
    }

    #[test]
    fn test_removed_node_can_be_relinked() {
        let mut arena = SlotArena::new();
        let mut first = IntrusiveList::new();
        let mut second = IntrusiveList::new();
        let id = alloc(&mut arena, 7);

        first.push_front(&mut arena, id);
        first.remove(&mut arena, id);
        second.push_front(&mut arena, id);

        assert!(first.is_empty());
        assert_eq!(values(&second, &arena), vec![7]);
        first.debug_validate(&arena);
        second.debug_validate(&arena);
    }
}
