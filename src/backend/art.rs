//! The adaptive radix tree backend (`spec.md` §4.2).
//!
//! [`node`] carries the node shapes and the insert/search/growth mechanics;
//! this module wraps a single root slot into the `Tree` handle the
//! dispatcher and the backend contract (`crate::backend::Backend`) deal in.

mod node;

use crate::counters::Counters;
use crate::frame::{byte_stream, Frame};

/// A per-stream-id ART tree: a single (possibly empty) root slot.
#[derive(Default)]
pub struct Tree {
    root: Option<Box<node::Node>>,
}

impl Tree {
    pub fn new() -> Self {
        Tree { root: None }
    }

    /// Inserts one sample's frames, viewed as a byte stream (`spec.md`
    /// §4.1), and folds the resulting tree depth into `counters`.
    pub fn insert(&mut self, frames: &[Frame], counters: &mut Counters) {
        let bytes = byte_stream(frames);
        node::insert(&mut self.root, bytes, counters);
        counters.observe_depth(node::height(&self.root));
    }

    /// `(full_matches, cumulative_count)` for the `Stats` fold
    /// (`SPEC_FULL.md` §10). Every ART insert consumes its whole byte
    /// stream before terminating, so the two are always equal — unlike the
    /// linux-callchain backend, there is no "partial stack, a longer one
    /// recorded elsewhere" distinction here.
    pub fn stats(&self) -> (u64, u64) {
        let total = node::total_count(&self.root);
        (total, total)
    }

    /// Exact-key count lookup, used by tests only (`spec.md` §1 "lookups
    /// are not required at steady state").
    pub fn search(&self, frames: &[Frame]) -> Option<u64> {
        node::search(&self.root, byte_stream(frames))
    }

    pub fn height(&self) -> u64 {
        node::height(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn frames_from_bytes(bytes: &[u8]) -> Vec<Frame> {
        // Tests below operate directly on byte keys (matching `spec.md`
        // §8's literal string scenarios); pack each byte into its own
        // single-byte-relevant frame pair is overkill, so these tests
        // insert through `node` byte streams via a thin helper instead.
        bytes.iter().map(|&b| Frame::new(b as u64, 0)).collect()
    }

    #[test]
    fn s3_exact_repeats_collapse_to_a_leaf_with_count() {
        let mut tree = Tree::new();
        let mut counters = Counters::new();
        let frames = frames_from_bytes(b"ABCDEFG");
        for _ in 0..3 {
            node::insert(
                &mut tree.root,
                &byte_stream(&frames),
                &mut counters,
            );
        }
        assert!(node::is_leaf(&tree.root));
        assert_eq!(node::root_count(&tree.root), 3);
        assert_eq!(node::height(&tree.root), 1);
    }

    #[test]
    fn stats_full_matches_equal_cumulative_count() {
        let mut tree = Tree::new();
        let mut counters = Counters::new();
        tree.insert(&frames_from_bytes(b"foobar"), &mut counters);
        tree.insert(&frames_from_bytes(b"fubar"), &mut counters);
        tree.insert(&frames_from_bytes(b"foobar"), &mut counters);
        let (full, cumulative) = tree.stats();
        assert_eq!(full, cumulative);
        assert_eq!(full, 3);
    }

    #[test]
    fn search_finds_every_inserted_key_after_mixed_inserts() {
        let mut tree = Tree::new();
        let mut counters = Counters::new();
        let k1 = frames_from_bytes(b"foobar");
        let k2 = frames_from_bytes(b"fubar");
        let k3 = frames_from_bytes(b"fizzbuzz");
        for _ in 0..5 {
            tree.insert(&k1, &mut counters);
        }
        for _ in 0..3 {
            tree.insert(&k2, &mut counters);
        }
        for _ in 0..7 {
            tree.insert(&k3, &mut counters);
        }
        assert_eq!(tree.search(&k1), Some(5));
        assert_eq!(tree.search(&k2), Some(3));
        assert_eq!(tree.search(&k3), Some(7));
        let (full, cumulative) = tree.stats();
        assert_eq!(full, cumulative);
        assert_eq!(full, 15);
    }
}
