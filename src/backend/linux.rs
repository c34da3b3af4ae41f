//! The linux-style callchain backend (`spec.md` §4.4).
//!
//! Grounded on `original_source/src/lib/linux/callstack.c`'s `insert()` /
//! `callchain_append` / `callstack_stats`: a sibling-ordered tree keyed
//! per-frame by `(ip, map handle)`, where samples sharing a prefix share
//! the corresponding path. Ordering uses the interned map handle's value,
//! not the raw map pointer (`spec.md` §4.4) — the interner guarantees
//! pointer-equality (here, `Rc` identity) is equivalent to value-equality,
//! so ordering by the handle's `map` value agrees with ordering by
//! identity while staying a total order usable for binary search.

use std::rc::Rc;

use crate::counters::Counters;
use crate::frame::Frame;
use crate::interner::{MapInterner, MapSymbol};

/// One consumed frame in the callchain tree. `cumulative_count` is this
/// node's own `count` plus every descendant's `count`, matching `spec.md`
/// §3's "Linux callchain tree" data model.
pub(crate) struct Node {
    pub ip: u64,
    pub map: Rc<MapSymbol>,
    pub count: u64,
    pub cumulative_count: u64,
    pub children: Vec<Node>,
}

impl Node {
    fn new(ip: u64, map: Rc<MapSymbol>) -> Self {
        Node {
            ip,
            map,
            count: 0,
            cumulative_count: 0,
            children: Vec::new(),
        }
    }

    fn order_key(&self) -> (u64, u64) {
        (self.ip, self.map.map)
    }
}

/// A per-stream-id callchain tree: the ordered set of top-level children
/// (the `Root`'s own node carries no frame of its own, so only its children
/// are modeled — `spec.md` §3 "A `Root` owns a `Node` whose children form
/// an ordered tree").
#[derive(Default)]
pub struct Tree {
    children: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { children: Vec::new() }
    }

    /// Drives a cursor through `frames`, creating nodes as needed and
    /// updating `count`/`cumulative_count` along the insertion path
    /// (`spec.md` §4.4 "Insert (`callchain_append`)"). An empty frame list
    /// matches the source's `if (!cursor->nr) return;` guard and is a
    /// no-op.
    pub fn insert(&mut self, frames: &[Frame], interner: &mut MapInterner, counters: &mut Counters) {
        if frames.is_empty() {
            return;
        }
        insert_level(&mut self.children, frames, interner, counters);
    }

    /// `(full_matches, cumulative_count)` summed over only the *top-level*
    /// children, matching `original_source/src/lib/linux/callstack.c`'s
    /// `callstack_stats`, which walks just `priv->root.node.rb_root_in`
    /// (the root's direct children) rather than the whole tree. Unlike the
    /// ART/hash backends, the two totals can differ here: a stack that is a
    /// strict prefix of a longer one recorded elsewhere in the same tree
    /// terminates at an ancestor node, so its `count` is not part of the
    /// deeper descendant's own `count`, yet both contribute to this
    /// top-level child's `cumulative_count`.
    pub fn stats(&self) -> (u64, u64) {
        let mut full_matches = 0u64;
        let mut cumulative = 0u64;
        for child in &self.children {
            full_matches += child.count;
            cumulative += child.cumulative_count;
        }
        (full_matches, cumulative)
    }

    /// Exact-key count lookup, used by tests only.
    pub fn search(&self, frames: &[Frame], interner: &mut MapInterner) -> Option<u64> {
        if frames.is_empty() {
            return None;
        }
        search_level(&self.children, frames, interner)
    }
}

fn insert_level(
    children: &mut Vec<Node>,
    frames: &[Frame],
    interner: &mut MapInterner,
    counters: &mut Counters,
) {
    let handle = interner.intern(frames[0].map);
    let ip = frames[0].ip;
    let target = (ip, handle.map);
    let i = match children.binary_search_by_key(&target, Node::order_key) {
        Ok(i) => i,
        Err(i) => {
            counters.record_alloc();
            children.insert(i, Node::new(ip, handle));
            i
        }
    };
    let node = &mut children[i];
    node.cumulative_count += 1;
    if frames.len() == 1 {
        node.count += 1;
    } else {
        insert_level(&mut node.children, &frames[1..], interner, counters);
    }
}

fn search_level(children: &[Node], frames: &[Frame], interner: &mut MapInterner) -> Option<u64> {
    let handle = interner.intern(frames[0].map);
    let target = (frames[0].ip, handle.map);
    let i = children.binary_search_by_key(&target, Node::order_key).ok()?;
    let node = &children[i];
    if frames.len() == 1 {
        Some(node.count)
    } else {
        search_level(&node.children, &frames[1..], interner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(pairs: &[(u64, u64)]) -> Vec<Frame> {
        pairs.iter().map(|&(ip, map)| Frame::new(ip, map)).collect()
    }

    #[test]
    fn shared_prefix_produces_one_shared_path() {
        let mut tree = Tree::new();
        let mut interner = MapInterner::new();
        let mut counters = Counters::new();
        let a = frames(&[(0x1000, 1), (0x2000, 1), (0x3000, 1)]);
        let b = frames(&[(0x1000, 1), (0x2000, 1), (0x4000, 1)]);
        tree.insert(&a, &mut interner, &mut counters);
        tree.insert(&b, &mut interner, &mut counters);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].children.len(), 1);
        assert_eq!(tree.children[0].children[0].children.len(), 2);
        assert_eq!(tree.search(&a, &mut interner), Some(1));
        assert_eq!(tree.search(&b, &mut interner), Some(1));
    }

    #[test]
    fn exact_repeats_increment_the_terminal_count() {
        let mut tree = Tree::new();
        let mut interner = MapInterner::new();
        let mut counters = Counters::new();
        let a = frames(&[(0x1000, 1), (0x2000, 1)]);
        for _ in 0..4 {
            tree.insert(&a, &mut interner, &mut counters);
        }
        assert_eq!(tree.search(&a, &mut interner), Some(4));
        let (full, cumulative) = tree.stats();
        assert_eq!(full, 4);
        assert_eq!(cumulative, 4);
    }

    #[test]
    fn prefix_and_extension_share_a_path_and_diverge_in_match_ratio() {
        let mut tree = Tree::new();
        let mut interner = MapInterner::new();
        let mut counters = Counters::new();
        let short = frames(&[(0x1000, 1)]);
        let long = frames(&[(0x1000, 1), (0x2000, 1)]);
        tree.insert(&short, &mut interner, &mut counters);
        tree.insert(&long, &mut interner, &mut counters);
        tree.insert(&long, &mut interner, &mut counters);
        // Top-level node's own count: only the one sample that terminated
        // exactly there (the short stack).
        assert_eq!(tree.children[0].count, 1);
        // Cumulative: all three samples passed through this node.
        assert_eq!(tree.children[0].cumulative_count, 3);
        let (full, cumulative) = tree.stats();
        assert_eq!(full, 1);
        assert_eq!(cumulative, 3);
    }

    #[test]
    fn empty_frame_list_is_a_no_op() {
        let mut tree = Tree::new();
        let mut interner = MapInterner::new();
        let mut counters = Counters::new();
        tree.insert(&[], &mut interner, &mut counters);
        assert!(tree.children.is_empty());
    }
}
