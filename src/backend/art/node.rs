//! Node shapes for the adaptive radix tree.
//!
//! Modeled as a sum type over `{Leaf, Inner4, Inner16, Inner48, Inner256}`
//! dispatched on the enum tag, per the source's own suggestion for a systems
//! target (`spec.md` §9 "Tagged node variants"). The source instead overlays
//! these layouts on one struct via a `flags` bitfield and raw pointer
//! arithmetic (`original_source/src/lib/art/art.h`); the sum type is the
//! idiomatic Rust translation of the same shape.
//!
//! Node prefixes are unbounded heap slices (`Box<[u8]>`) rather than the
//! source's fixed `prefix[128]` array chained across multiple inner nodes
//! when a common prefix overflows capacity — `spec.md` §9 explicitly permits
//! either representation, and the heap slice is the simpler of the two.

use tracing::trace;

use crate::counters::Counters;

/// Sentinel marking an unoccupied slot in an [`Inner48`] index array,
/// matching `original_source/src/lib/art/art.h`'s `EMPTY 0xff`.
const EMPTY: u8 = 0xFF;

pub(crate) enum Node {
    Leaf(Leaf),
    Inner4(Box<Inner4>),
    Inner16(Box<Inner16>),
    Inner48(Box<Inner48>),
    Inner256(Box<Inner256>),
}

/// Owns the remaining key suffix past the path that reached it (lazy
/// expansion: a single leaf may stand in for an arbitrarily long unique
/// key). Ownership, not a borrow into the originating sample, is the choice
/// recorded in `DESIGN.md` Open Question 3 to sidestep the source's
/// `cfree(node->key, leaf)` double-ownership bug (`spec.md` §5/§9).
pub(crate) struct Leaf {
    pub suffix: Box<[u8]>,
    pub count: u64,
}

pub(crate) struct Inner4 {
    pub prefix: Box<[u8]>,
    pub count: u64,
    pub len: u8,
    pub keys: [u8; 4],
    pub children: [Option<Box<Node>>; 4],
}

pub(crate) struct Inner16 {
    pub prefix: Box<[u8]>,
    pub count: u64,
    pub len: u8,
    pub keys: [u8; 16],
    pub children: [Option<Box<Node>>; 16],
}

pub(crate) struct Inner48 {
    pub prefix: Box<[u8]>,
    pub count: u64,
    pub len: u8,
    /// `index[byte] == EMPTY` means unoccupied, else a slot in `children`.
    pub index: [u8; 256],
    pub children: [Option<Box<Node>>; 48],
}

pub(crate) struct Inner256 {
    pub prefix: Box<[u8]>,
    pub count: u64,
    pub len: u16,
    pub children: [Option<Box<Node>>; 256],
}

impl Inner4 {
    fn empty() -> Self {
        Inner4 {
            prefix: Box::new([]),
            count: 0,
            len: 0,
            keys: [0; 4],
            children: [None, None, None, None],
        }
    }

    fn add_child(&mut self, selector: u8, child: Box<Node>) {
        debug_assert!((self.len as usize) < 4, "Inner4 add_child on a full node");
        let i = self.len as usize;
        self.keys[i] = selector;
        self.children[i] = Some(child);
        self.len += 1;
    }
}

impl Inner16 {
    fn from_inner4(old: Box<Inner4>) -> Self {
        let mut keys = [0u8; 16];
        keys[..4].copy_from_slice(&old.keys);
        let mut children: [Option<Box<Node>>; 16] = std::array::from_fn(|_| None);
        for (slot, child) in children.iter_mut().zip(old.children) {
            *slot = child;
        }
        Inner16 {
            prefix: old.prefix,
            count: old.count,
            len: old.len,
            keys,
            children,
        }
    }

    fn add_child(&mut self, selector: u8, child: Box<Node>) {
        debug_assert!((self.len as usize) < 16, "Inner16 add_child on a full node");
        let i = self.len as usize;
        self.keys[i] = selector;
        self.children[i] = Some(child);
        self.len += 1;
    }
}

impl Inner48 {
    fn from_inner16(old: Box<Inner16>) -> Self {
        let mut index = [EMPTY; 256];
        let mut children: [Option<Box<Node>>; 48] = std::array::from_fn(|_| None);
        for (i, (&key, child)) in old.keys.iter().zip(old.children).enumerate().take(old.len as usize) {
            index[key as usize] = i as u8;
            children[i] = child;
        }
        Inner48 {
            prefix: old.prefix,
            count: old.count,
            len: old.len,
            index,
            children,
        }
    }

    fn add_child(&mut self, selector: u8, child: Box<Node>) {
        debug_assert!((self.len as usize) < 48, "Inner48 add_child on a full node");
        let i = self.len as usize;
        self.index[selector as usize] = i as u8;
        self.children[i] = Some(child);
        self.len += 1;
    }
}

impl Inner256 {
    fn from_inner48(old: Box<Inner48>) -> Self {
        let mut children: [Option<Box<Node>>; 256] = std::array::from_fn(|_| None);
        for (k, slot) in old.index.iter().enumerate() {
            if *slot != EMPTY {
                children[k] = old.children[*slot as usize].take();
            }
        }
        Inner256 {
            prefix: old.prefix,
            count: old.count,
            len: old.len as u16,
            children,
        }
    }

    fn add_child(&mut self, selector: u8, child: Box<Node>) {
        debug_assert!(self.children[selector as usize].is_none(), "Inner256 add_child over an occupied slot");
        self.children[selector as usize] = Some(child);
        self.len += 1;
    }
}

fn node_prefix(node: &Node) -> &[u8] {
    match node {
        Node::Leaf(_) => &[],
        Node::Inner4(n) => &n.prefix,
        Node::Inner16(n) => &n.prefix,
        Node::Inner48(n) => &n.prefix,
        Node::Inner256(n) => &n.prefix,
    }
}

fn set_node_prefix(node: &mut Node, prefix: Box<[u8]>) {
    match node {
        Node::Leaf(_) => unreachable!("leaves have no prefix"),
        Node::Inner4(n) => n.prefix = prefix,
        Node::Inner16(n) => n.prefix = prefix,
        Node::Inner48(n) => n.prefix = prefix,
        Node::Inner256(n) => n.prefix = prefix,
    }
}

fn node_count_mut(node: &mut Node) -> &mut u64 {
    match node {
        Node::Leaf(n) => &mut n.count,
        Node::Inner4(n) => &mut n.count,
        Node::Inner16(n) => &mut n.count,
        Node::Inner48(n) => &mut n.count,
        Node::Inner256(n) => &mut n.count,
    }
}

fn occupied_len(node: &Node) -> usize {
    match node {
        Node::Leaf(_) => 0,
        Node::Inner4(n) => n.len as usize,
        Node::Inner16(n) => n.len as usize,
        Node::Inner48(n) => n.len as usize,
        Node::Inner256(n) => n.len as usize,
    }
}

fn node_kind(node: &Node) -> &'static str {
    match node {
        Node::Leaf(_) => "leaf",
        Node::Inner4(_) => "inner4",
        Node::Inner16(_) => "inner16",
        Node::Inner48(_) => "inner48",
        Node::Inner256(_) => "inner256",
    }
}

fn is_full(node: &Node) -> bool {
    match node {
        Node::Leaf(_) => false,
        Node::Inner4(n) => n.len as usize == 4,
        Node::Inner16(n) => n.len as usize == 16,
        Node::Inner48(n) => n.len as usize == 48,
        Node::Inner256(_) => false,
    }
}

fn find_child_mut<'a>(node: &'a mut Node, selector: u8) -> Option<&'a mut Option<Box<Node>>> {
    match node {
        Node::Leaf(_) => None,
        Node::Inner4(n) => n.keys[..n.len as usize]
            .iter()
            .position(|&k| k == selector)
            .map(move |i| &mut n.children[i]),
        Node::Inner16(n) => n.keys[..n.len as usize]
            .iter()
            .position(|&k| k == selector)
            .map(move |i| &mut n.children[i]),
        Node::Inner48(n) => {
            let i = n.index[selector as usize];
            if i == EMPTY {
                None
            } else {
                Some(&mut n.children[i as usize])
            }
        }
        Node::Inner256(n) => {
            if n.children[selector as usize].is_some() {
                Some(&mut n.children[selector as usize])
            } else {
                None
            }
        }
    }
}

/// Adds a child under a selector not currently occupied. Caller must ensure
/// capacity (via [`grow_if_full`]) beforehand; violating that is an
/// internal-invariant violation (`spec.md` §7) and panics.
fn add_child(node: &mut Node, selector: u8, child: Box<Node>) {
    match node {
        Node::Leaf(_) => unreachable!("leaves have no children"),
        Node::Inner4(n) => n.add_child(selector, child),
        Node::Inner16(n) => n.add_child(selector, child),
        Node::Inner48(n) => n.add_child(selector, child),
        Node::Inner256(n) => n.add_child(selector, child),
    }
}

/// Grows a full inner node to the next larger variant in place (`spec.md`
/// §4.2 "Growth"), preserving every existing child and the node's own
/// prefix/count. A no-op for a non-full node or for Inner256, which has no
/// successor.
fn grow_if_full(node: &mut Node, counters: &mut Counters) {
    if !is_full(node) {
        return;
    }
    let from = node_kind(node);
    let grown = match std::mem::replace(node, Node::Leaf(Leaf { suffix: Box::new([]), count: 0 })) {
        Node::Inner4(old) => Node::Inner16(Box::new(Inner16::from_inner4(old))),
        Node::Inner16(old) => Node::Inner48(Box::new(Inner48::from_inner16(old))),
        Node::Inner48(old) => Node::Inner256(Box::new(Inner256::from_inner48(old))),
        other => other,
    };
    trace!(from, to = node_kind(&grown), "art inner node grown");
    counters.record_alloc();
    counters.record_free();
    *node = grown;
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Walks from `slot`, inserting `remaining` (the byte-stream view of a
/// sample from the current depth onward). See `SPEC_FULL.md` §4.2a/§4.2b
/// for the full case analysis this implements.
pub(crate) fn insert(slot: &mut Option<Box<Node>>, remaining: &[u8], counters: &mut Counters) {
    if slot.is_none() {
        // Step 1: empty root/slot.
        counters.record_alloc();
        counters.record_unique_entry();
        *slot = Some(Box::new(Node::Leaf(Leaf {
            suffix: remaining.to_vec().into_boxed_slice(),
            count: 1,
        })));
        return;
    }

    let is_leaf_equal_or_split = matches!(slot.as_deref(), Some(Node::Leaf(_)));
    if is_leaf_equal_or_split {
        let leaf_matches_exactly = {
            let Node::Leaf(leaf) = slot.as_deref_mut().unwrap() else {
                unreachable!()
            };
            let m = common_prefix_len(&leaf.suffix, remaining);
            if m == leaf.suffix.len() && m == remaining.len() {
                // Step 2, equal: increment and return.
                leaf.count += 1;
                true
            } else {
                false
            }
        };
        if leaf_matches_exactly {
            return;
        }
        // Step 2, common prefix only: split. The old leaf node is consumed
        // here and replaced by the new inner node `split_leaf` builds.
        let Node::Leaf(old_leaf) = *slot.take().unwrap() else {
            unreachable!()
        };
        counters.record_leaf_free();
        *slot = Some(Box::new(split_leaf(old_leaf, remaining, counters)));
        return;
    }

    // Step 3: inner node reached.
    insert_inner(slot.as_mut().unwrap(), remaining, counters);
}

fn split_leaf(old_leaf: Leaf, remaining: &[u8], counters: &mut Counters) -> Node {
    let Leaf {
        suffix: old_key,
        count: old_count,
    } = old_leaf;
    let m = common_prefix_len(&old_key, remaining);
    let old_exhausted = m == old_key.len();
    let new_exhausted = m == remaining.len();

    counters.record_alloc();
    let mut inner = Inner4::empty();

    match (old_exhausted, new_exhausted) {
        (true, true) => unreachable!("equal keys are handled before splitting"),
        (true, false) => {
            // Old key is a strict prefix of the incoming stream
            // (`SPEC_FULL.md` §4.2a case 2 — the case named in `spec.md` §9).
            let selector = remaining[m];
            let child = Box::new(Node::Leaf(Leaf {
                suffix: remaining[m + 1..].to_vec().into_boxed_slice(),
                count: 1,
            }));
            inner.prefix = old_key;
            inner.count = old_count;
            counters.record_alloc();
            counters.record_unique_entry();
            inner.add_child(selector, child);
        }
        (false, true) => {
            // Incoming stream is a strict prefix of the old key
            // (`SPEC_FULL.md` §4.2a case 3, the symmetric completion).
            let selector = old_key[m];
            let child = Box::new(Node::Leaf(Leaf {
                suffix: old_key[m + 1..].to_vec().into_boxed_slice(),
                count: old_count,
            }));
            inner.prefix = remaining.to_vec().into_boxed_slice();
            inner.count = 1;
            counters.record_unique_entry();
            inner.add_child(selector, child);
        }
        (false, false) => {
            // Genuine two-way divergence (`spec.md` §4.2 step 2, literal case).
            let old_selector = old_key[m];
            let old_child = Box::new(Node::Leaf(Leaf {
                suffix: old_key[m + 1..].to_vec().into_boxed_slice(),
                count: old_count,
            }));
            let new_selector = remaining[m];
            let new_child = Box::new(Node::Leaf(Leaf {
                suffix: remaining[m + 1..].to_vec().into_boxed_slice(),
                count: 1,
            }));
            inner.prefix = old_key[..m].to_vec().into_boxed_slice();
            inner.count = 0;
            counters.record_alloc();
            counters.record_unique_entry();
            inner.add_child(old_selector, old_child);
            inner.add_child(new_selector, new_child);
        }
    }
    Node::Inner4(Box::new(inner))
}

fn insert_inner(boxed: &mut Box<Node>, remaining: &[u8], counters: &mut Counters) {
    let prefix_len = node_prefix(boxed).len();
    let check_len = prefix_len.min(remaining.len());
    let m = common_prefix_len(&node_prefix(boxed)[..check_len], &remaining[..check_len]);

    if m < prefix_len {
        // Step 3, mismatch: split this inner node.
        let old = std::mem::replace(boxed, Box::new(Node::Leaf(Leaf { suffix: Box::new([]), count: 0 })));
        **boxed = split_inner(old, m, remaining, counters);
        return;
    }

    // Step 3, full match: advance past the prefix.
    let rest = &remaining[prefix_len..];
    if rest.is_empty() {
        // Step 4: the stream ends exactly at this inner node. A count of
        // zero beforehand means no earlier insert ever terminated here —
        // this is the first time this exact (shorter) key is observed.
        let count = node_count_mut(boxed);
        let first_observation = *count == 0;
        *count += 1;
        if first_observation {
            counters.record_unique_entry();
        }
        return;
    }

    let selector = rest[0];
    let child_rest = &rest[1..];
    if let Some(slot) = find_child_mut(boxed, selector) {
        // Step 5, present: advance one byte and recurse.
        insert(slot, child_rest, counters);
    } else {
        // Step 5, absent: grow if necessary, then install a fresh leaf.
        grow_if_full(boxed, counters);
        counters.record_alloc();
        counters.record_unique_entry();
        let leaf = Box::new(Node::Leaf(Leaf {
            suffix: child_rest.to_vec().into_boxed_slice(),
            count: 1,
        }));
        add_child(boxed, selector, leaf);
    }
}

fn split_inner(mut old: Box<Node>, m: usize, remaining: &[u8], counters: &mut Counters) -> Node {
    let old_prefix: Box<[u8]> = node_prefix(&old).to_vec().into_boxed_slice();
    let old_selector = old_prefix[m];
    set_node_prefix(&mut old, old_prefix[m + 1..].to_vec().into_boxed_slice());

    counters.record_alloc();
    let mut inner = Inner4::empty();

    if m == remaining.len() {
        // The incoming stream ends exactly within the old node's prefix
        // (`SPEC_FULL.md` §4.2a case 3 analog for inner-prefix mismatches).
        inner.prefix = remaining.to_vec().into_boxed_slice();
        inner.count = 1;
        counters.record_unique_entry();
        inner.add_child(old_selector, old);
    } else {
        // Two-way divergence (`spec.md` §4.2 step 3, literal case).
        inner.prefix = old_prefix[..m].to_vec().into_boxed_slice();
        inner.count = 0;
        let new_selector = remaining[m];
        let new_leaf = Box::new(Node::Leaf(Leaf {
            suffix: remaining[m + 1..].to_vec().into_boxed_slice(),
            count: 1,
        }));
        counters.record_alloc();
        counters.record_unique_entry();
        inner.add_child(old_selector, old);
        inner.add_child(new_selector, new_leaf);
    }
    Node::Inner4(Box::new(inner))
}

/// Symmetric lookup, used by tests and by the `count` query (`spec.md` §4.2
/// "Lookup (`search`)"). Returns the count at the node whose reconstructed
/// path exactly equals `remaining`, if any.
pub(crate) fn search(slot: &Option<Box<Node>>, remaining: &[u8]) -> Option<u64> {
    search_node(slot.as_deref()?, remaining)
}

fn search_node(node: &Node, remaining: &[u8]) -> Option<u64> {
    match node {
        Node::Leaf(leaf) => {
            if *leaf.suffix == *remaining {
                Some(leaf.count)
            } else {
                None
            }
        }
        _ => {
            let prefix_len = node_prefix(node).len();
            if remaining.len() < prefix_len || node_prefix(node) != &remaining[..prefix_len] {
                return None;
            }
            let rest = &remaining[prefix_len..];
            if rest.is_empty() {
                let count = match node {
                    Node::Inner4(n) => n.count,
                    Node::Inner16(n) => n.count,
                    Node::Inner48(n) => n.count,
                    Node::Inner256(n) => n.count,
                    Node::Leaf(_) => unreachable!(),
                };
                return Some(count);
            }
            let selector = rest[0];
            let child = match node {
                Node::Inner4(n) => n.keys[..n.len as usize]
                    .iter()
                    .position(|&k| k == selector)
                    .and_then(|i| n.children[i].as_deref()),
                Node::Inner16(n) => n.keys[..n.len as usize]
                    .iter()
                    .position(|&k| k == selector)
                    .and_then(|i| n.children[i].as_deref()),
                Node::Inner48(n) => {
                    let i = n.index[selector as usize];
                    if i == EMPTY {
                        None
                    } else {
                        n.children[i as usize].as_deref()
                    }
                }
                Node::Inner256(n) => n.children[selector as usize].as_deref(),
                Node::Leaf(_) => unreachable!(),
            };
            search_node(child?, &rest[1..])
        }
    }
}

/// Sums `count` over every node in the tree — leaves and inner nodes alike.
/// Every insert advances to exactly one terminal node (a leaf or an inner
/// node whose prefix match exhausts the stream) and increments that node's
/// `count` exactly once (`spec.md` invariant 6), so this total equals the
/// number of samples ever inserted into the tree (`spec.md` §8 property 1,
/// "count conservation").
pub(crate) fn total_count(slot: &Option<Box<Node>>) -> u64 {
    match slot.as_deref() {
        None => 0,
        Some(Node::Leaf(n)) => n.count,
        Some(Node::Inner4(n)) => n.count + n.children.iter().map(total_count).sum::<u64>(),
        Some(Node::Inner16(n)) => n.count + n.children.iter().map(total_count).sum::<u64>(),
        Some(Node::Inner48(n)) => n.count + n.children.iter().map(total_count).sum::<u64>(),
        Some(Node::Inner256(n)) => n.count + n.children.iter().map(total_count).sum::<u64>(),
    }
}

/// Counts the nodes on the longest root-to-leaf path (a lone leaf root has
/// height 1), matching `original_source/src/lib/art/test.c`'s `max_height`.
/// Used by tests rather than the best-effort [`Counters::max_depth`]
/// diagnostic, since a later split can deepen an already-inserted subtree
/// without that subtree being revisited.
pub(crate) fn height(slot: &Option<Box<Node>>) -> u64 {
    match slot {
        None => 0,
        Some(node) => match &**node {
            Node::Leaf(_) => 1,
            Node::Inner4(n) => 1 + children_max_height(&n.children),
            Node::Inner16(n) => 1 + children_max_height(&n.children),
            Node::Inner48(n) => 1 + children_max_height(&n.children),
            Node::Inner256(n) => 1 + children_max_height(&n.children),
        },
    }
}

fn children_max_height(children: &[Option<Box<Node>>]) -> u64 {
    children.iter().map(height).max().unwrap_or(0)
}

/// Occupied child-selector bytes at this node, used by property tests
/// checking "no duplicate children" (`spec.md` §8 property 4).
#[cfg(test)]
pub(crate) fn selectors(slot: &Option<Box<Node>>) -> Vec<u8> {
    match slot.as_deref() {
        None | Some(Node::Leaf(_)) => Vec::new(),
        Some(Node::Inner4(n)) => n.keys[..n.len as usize].to_vec(),
        Some(Node::Inner16(n)) => n.keys[..n.len as usize].to_vec(),
        Some(Node::Inner48(n)) => (0..256u16)
            .filter(|&k| n.index[k as usize] != EMPTY)
            .map(|k| k as u8)
            .collect(),
        Some(Node::Inner256(n)) => (0..256u16)
            .filter(|&k| n.children[k as usize].is_some())
            .map(|k| k as u8)
            .collect(),
    }
}

#[cfg(test)]
pub(crate) use self::test_access::*;

#[cfg(test)]
mod test_access {
    use super::*;

    pub(crate) fn is_leaf(slot: &Option<Box<Node>>) -> bool {
        matches!(slot.as_deref(), Some(Node::Leaf(_)))
    }

    pub(crate) fn is_inner4(slot: &Option<Box<Node>>) -> bool {
        matches!(slot.as_deref(), Some(Node::Inner4(_)))
    }

    pub(crate) fn is_inner16(slot: &Option<Box<Node>>) -> bool {
        matches!(slot.as_deref(), Some(Node::Inner16(_)))
    }

    pub(crate) fn is_inner48(slot: &Option<Box<Node>>) -> bool {
        matches!(slot.as_deref(), Some(Node::Inner48(_)))
    }

    pub(crate) fn prefix(slot: &Option<Box<Node>>) -> Vec<u8> {
        slot.as_deref().map(node_prefix).unwrap_or(&[]).to_vec()
    }

    pub(crate) fn leaf_suffix(slot: &Option<Box<Node>>, selector: u8) -> Option<Vec<u8>> {
        let node = slot.as_deref()?;
        let child = match node {
            Node::Inner4(n) => n.keys[..n.len as usize]
                .iter()
                .position(|&k| k == selector)
                .and_then(|i| n.children[i].as_ref()),
            Node::Inner16(n) => n.keys[..n.len as usize]
                .iter()
                .position(|&k| k == selector)
                .and_then(|i| n.children[i].as_ref()),
            Node::Inner48(n) => {
                let i = n.index[selector as usize];
                if i == EMPTY {
                    None
                } else {
                    n.children[i as usize].as_ref()
                }
            }
            Node::Inner256(n) => n.children[selector as usize].as_ref(),
            Node::Leaf(_) => None,
        }?;
        match &**child {
            Node::Leaf(leaf) => Some(leaf.suffix.to_vec()),
            _ => None,
        }
    }

    pub(crate) fn root_count(slot: &Option<Box<Node>>) -> u64 {
        match slot.as_deref() {
            None => 0,
            Some(Node::Leaf(n)) => n.count,
            Some(Node::Inner4(n)) => n.count,
            Some(Node::Inner16(n)) => n.count,
            Some(Node::Inner48(n)) => n.count,
            Some(Node::Inner256(n)) => n.count,
        }
    }
}

/// The literal end-to-end scenarios of `spec.md` §8 (S1, S2, S4, S5 — S3 is
/// covered by `backend::art::tests`, S6/S7 by the hash backend's own
/// tests). These need `test_access`'s internal shape inspectors, so they
/// live here rather than as crate-external integration tests.
#[cfg(test)]
mod scenario_tests {
    use super::*;

    fn insert_str(root: &mut Option<Box<Node>>, s: &str, counters: &mut Counters) {
        insert(root, s.as_bytes(), counters);
    }

    #[test]
    fn s1_two_keys_sharing_a_one_byte_prefix() {
        let mut root = None;
        let mut counters = Counters::new();
        insert_str(&mut root, "foobar", &mut counters);
        insert_str(&mut root, "fubar", &mut counters);

        assert!(is_inner4(&root));
        assert_eq!(prefix(&root), b"f");
        let mut sels = selectors(&root);
        sels.sort_unstable();
        assert_eq!(sels, vec![b'o', b'u']);
        assert_eq!(height(&root), 2);
    }

    #[test]
    fn s2_strict_extension_splits_the_shared_tail() {
        let mut root = None;
        let mut counters = Counters::new();
        insert_str(&mut root, "ABCDE", &mut counters);
        insert_str(&mut root, "ABCDEFG", &mut counters);
        insert_str(&mut root, "ABCDEH", &mut counters);

        assert!(is_inner4(&root));
        assert_eq!(prefix(&root), b"ABCDE");
        let mut sels = selectors(&root);
        sels.sort_unstable();
        assert_eq!(sels, vec![b'F', b'H']);
        // `SPEC_FULL.md` §4.2b: the selector byte 'F' is consumed on the
        // edge, so the leaf's own stored suffix is "G", not "FG".
        assert_eq!(leaf_suffix(&root, b'F'), Some(b"G".to_vec()));
    }

    #[test]
    fn s3_three_exact_repeats_collapse_to_a_single_leaf() {
        let mut root = None;
        let mut counters = Counters::new();
        for _ in 0..3 {
            insert_str(&mut root, "ABCDEFG", &mut counters);
        }
        assert!(is_leaf(&root));
        assert_eq!(root_count(&root), 3);
        assert_eq!(height(&root), 1);
    }

    #[test]
    fn s4_chain_of_single_byte_extensions_reaches_height_26() {
        let mut root = None;
        let mut counters = Counters::new();
        let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        for len in 1..=alphabet.len() {
            insert_str(&mut root, &alphabet[..len], &mut counters);
        }
        assert!(is_inner4(&root));
        assert_eq!(height(&root), 26);
    }

    #[test]
    fn s5_seventeen_single_byte_keys_grow_4_to_16_to_48() {
        let mut root = None;
        let mut counters = Counters::new();
        let keys: Vec<u8> = (b'A'..=b'Q').collect();
        assert_eq!(keys.len(), 17);
        for &k in &keys {
            insert(&mut root, &[k], &mut counters);
        }
        assert!(is_inner48(&root));
        assert_eq!(occupied_len(root.as_deref().unwrap()), 17);
        for &k in &keys {
            assert_eq!(search(&root, &[k]), Some(1));
        }
    }
}
