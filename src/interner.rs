//! The map interner (`spec.md` §4.5/§3).
//!
//! Grounded on `original_source/src/lib/linux/callstack.c`'s `get_map()`: an
//! ordered map from raw map value to a canonical heap-allocated handle, plus
//! a one-slot "last handle" cache checked before the ordered-map lookup. The
//! source keys the ordered map with an rbtree with a cached leftmost node;
//! `spec.md` §9 notes the leftmost cache is never read by this codebase, so
//! (per `DESIGN.md` Open Question resolution) this uses a plain sorted
//! `Vec` with binary search rather than a tree structure.

use std::rc::Rc;

/// A canonical handle for a distinct map value. Any two equal raw map
/// values yield `Rc`s pointing at the same allocation for the lifetime of
/// the interner (`spec.md` §3 "Handle lifetime = process lifetime").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSymbol {
    pub map: u64,
}

/// Ordered map from raw map value to its interned handle, with a one-slot
/// most-recently-returned cache (`spec.md` §4.5).
#[derive(Default)]
pub struct MapInterner {
    entries: Vec<(u64, Rc<MapSymbol>)>,
    last: Option<Rc<MapSymbol>>,
}

impl MapInterner {
    pub fn new() -> Self {
        MapInterner {
            entries: Vec::new(),
            last: None,
        }
    }

    /// Returns the canonical handle for `map`, interning it on first sight.
    /// Checks the one-slot cache first (`get_map`'s `last_ms` check); falls
    /// back to a binary search over the sorted entry vector, inserting at
    /// the correct position on a miss so the vector stays sorted.
    pub fn intern(&mut self, map: u64) -> Rc<MapSymbol> {
        if let Some(last) = &self.last {
            if last.map == map {
                return Rc::clone(last);
            }
        }

        let handle = match self.entries.binary_search_by_key(&map, |(k, _)| *k) {
            Ok(i) => Rc::clone(&self.entries[i].1),
            Err(i) => {
                let handle = Rc::new(MapSymbol { map });
                self.entries.insert(i, (map, Rc::clone(&handle)));
                handle
            }
        };
        self.last = Some(Rc::clone(&handle));
        handle
    }

    /// Number of distinct map values interned so far, exposed for the CLI's
    /// `Number of maps: <M>` line (`spec.md` §6).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
