//! Diagnostic counters (`spec.md` §9 "Global mutable counters",
//! `SPEC_FULL.md` §10). Pure diagnostics, threaded by `&mut` reference
//! through every backend's `insert` rather than kept as process-global
//! mutable state — `original_source/src/ccalloc.c`'s `num_allocs`/
//! `num_frees`/`leaf_frees` and `original_source/src/lib/art/art.h`'s
//! max-depth tracking are globals in the source; a threaded struct is the
//! idiomatic Rust rendition the spec itself recommends.

/// Allocation/free/depth diagnostics, mirroring the source's global
/// counters. Never consulted for correctness, only for the CLI stats block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub num_allocs: u64,
    pub num_frees: u64,
    pub leaf_frees: u64,
    pub max_depth: u64,
    pub num_unique_entries: u64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_alloc(&mut self) {
        self.num_allocs += 1;
    }

    pub fn record_free(&mut self) {
        self.num_frees += 1;
    }

    pub fn record_leaf_free(&mut self) {
        self.num_frees += 1;
        self.leaf_frees += 1;
    }

    pub fn record_unique_entry(&mut self) {
        self.num_unique_entries += 1;
    }

    /// Folds a per-insert depth observation into the running max-depth
    /// diagnostic (`original_source/src/lib/art/art.h`'s `__max_depth`).
    pub fn observe_depth(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }
}
