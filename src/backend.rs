//! The backend contract (`spec.md` §4.1) and the three interchangeable
//! implementations behind it.
//!
//! Every backend exposes the same four operations — `new`, `insert`,
//! `stats`, `put` — so the dispatcher and the CLI never need to know which
//! one is selected. [`Backend`] expresses that contract generically (used
//! by the property tests in `SPEC_FULL.md` §8, parameterized over the
//! backend); [`Tree`] is the concrete, runtime-selected handle the
//! dispatcher actually stores, modeled as a tagged sum type per `spec.md`
//! §9 "Tagged node variants" rather than a trait object, matching the
//! teacher's own tag-dispatch idiom in `src/patch/branch.rs`.

pub mod art;
pub mod hash;
pub mod linux;

use clap::ValueEnum;

use crate::counters::Counters;
use crate::frame::Frame;
use crate::interner::MapInterner;
use crate::stats::Stats;

/// Backend identifier strings (`spec.md` §6): `"art"`, `"hash"`, `"linux"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Art,
    Hash,
    Linux,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Art => "art",
            BackendKind::Hash => "hash",
            BackendKind::Linux => "linux",
        }
    }
}

/// The backend contract (`spec.md` §4.1 table): `new`/`insert`/`stats`/
/// `put`. `put` has no Rust-idiomatic counterpart beyond ordinary scope
/// exit — a Tree's `Drop` releases it, so the contract surface here is the
/// three operations with an observable effect.
pub trait Backend {
    type Tree: Default;

    fn new_tree() -> Self::Tree {
        Self::Tree::default()
    }

    fn insert(tree: &mut Self::Tree, frames: &[Frame], counters: &mut Counters, interner: &mut MapInterner);

    fn stats(tree: &Self::Tree, out: &mut Stats);
}

/// Marker type selecting the ART backend for the generic [`Backend`]
/// contract.
pub struct ArtBackend;

impl Backend for ArtBackend {
    type Tree = art::Tree;

    fn insert(tree: &mut art::Tree, frames: &[Frame], counters: &mut Counters, _interner: &mut MapInterner) {
        tree.insert(frames, counters);
    }

    fn stats(tree: &art::Tree, out: &mut Stats) {
        let (full, cumulative) = tree.stats();
        out.record_tree(full, cumulative);
    }
}

/// Marker type selecting the hash-table backend for the generic [`Backend`]
/// contract.
pub struct HashBackend;

impl Backend for HashBackend {
    type Tree = hash::Table;

    fn insert(tree: &mut hash::Table, frames: &[Frame], counters: &mut Counters, _interner: &mut MapInterner) {
        tree.insert(frames, counters);
    }

    fn stats(tree: &hash::Table, out: &mut Stats) {
        let (full, cumulative) = tree.stats();
        out.record_tree(full, cumulative);
    }
}

/// Marker type selecting the linux-callchain backend for the generic
/// [`Backend`] contract.
pub struct LinuxBackend;

impl Backend for LinuxBackend {
    type Tree = linux::Tree;

    fn insert(tree: &mut linux::Tree, frames: &[Frame], counters: &mut Counters, interner: &mut MapInterner) {
        tree.insert(frames, interner, counters);
    }

    fn stats(tree: &linux::Tree, out: &mut Stats) {
        let (full, cumulative) = tree.stats();
        out.record_tree(full, cumulative);
    }
}

/// The runtime-selected tree handle a dispatcher entry owns. Every Tree in
/// the system belongs to the one backend chosen at startup (`spec.md`
/// §4.1 "Backends are selected once at startup").
pub enum Tree {
    Art(art::Tree),
    Hash(hash::Table),
    Linux(linux::Tree),
}

impl Tree {
    pub fn new(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Art => Tree::Art(ArtBackend::new_tree()),
            BackendKind::Hash => Tree::Hash(HashBackend::new_tree()),
            BackendKind::Linux => Tree::Linux(LinuxBackend::new_tree()),
        }
    }

    pub fn insert(&mut self, frames: &[Frame], counters: &mut Counters, interner: &mut MapInterner) {
        match self {
            Tree::Art(t) => ArtBackend::insert(t, frames, counters, interner),
            Tree::Hash(t) => HashBackend::insert(t, frames, counters, interner),
            Tree::Linux(t) => LinuxBackend::insert(t, frames, counters, interner),
        }
    }

    pub fn stats(&self, out: &mut Stats) {
        match self {
            Tree::Art(t) => ArtBackend::stats(t, out),
            Tree::Hash(t) => HashBackend::stats(t, out),
            Tree::Linux(t) => LinuxBackend::stats(t, out),
        }
    }
}
