//! The two-tier hash table backend (`spec.md` §4.3).
//!
//! Grounded on `original_source/src/lib/hashtable/hashtable.c`'s flat
//! `1<<16`-bucket table structurally; the inline tier on top of it is an
//! explicit spec redesign (`spec.md` §4.3), not present in the original,
//! followed here as written. The source hashes with a rolling hash
//! (`basic_hash`) but `spec.md` explicitly mandates Jenkins, which governs
//! per the task's own precedence rule (see `DESIGN.md`).
//!
//! Collision policy: the source `assert`s no two distinct keys ever land in
//! the same bucket. `spec.md` §4.3/§9 name chaining as the alternative to a
//! fail-fast assert; this backend chains (`DESIGN.md` Open Question 6) so
//! `insert` stays infallible on a workload an adversarial hash could
//! otherwise abort the whole process over.

use arrayvec::ArrayVec;
use tracing::trace;

use crate::counters::Counters;
use crate::frame::{byte_stream, Frame};

/// Number of inline slots before the table upgrades to hashed mode
/// (`spec.md` §3).
const N_INLINE: usize = 3;

/// Bits of the Jenkins hash kept as the bucket index (`spec.md` §4.3); the
/// indirect array has `1 << HASH_BITS` slots.
const HASH_BITS: u32 = 16;
const TABLE_SIZE: usize = 1 << HASH_BITS;

/// One distinct key and its observation count. The key is an owned copy of
/// the sample's byte-stream view (`spec.md` §4.3 "Key lifetime" — the
/// source borrows from the originating sample; `DESIGN.md` Open Question 5
/// chooses the owning, sample-lifetime-independent alternative the spec
/// names as equally valid).
struct Bucket {
    key: Box<[u8]>,
    count: u64,
}

enum Mode {
    Inline(ArrayVec<Bucket, N_INLINE>),
    Hashed(Box<[Vec<Bucket>]>),
}

/// A per-stream-id hash table: `N_INLINE` inline slots, then a hashed
/// indirect array with chained buckets per slot (`spec.md` §4.3).
pub struct Table {
    mode: Mode,
    unique: u64,
    hits: u64,
}

impl Default for Table {
    fn default() -> Self {
        Table::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Table {
            mode: Mode::Inline(ArrayVec::new()),
            unique: 0,
            hits: 0,
        }
    }

    pub fn insert(&mut self, frames: &[Frame], counters: &mut Counters) {
        let key = byte_stream(frames);

        if let Mode::Inline(inline) = &mut self.mode {
            if let Some(bucket) = inline.iter_mut().find(|b| &*b.key == key) {
                bucket.count += 1;
                self.hits += 1;
                return;
            }
            if inline.len() < N_INLINE {
                counters.record_alloc();
                inline.push(Bucket {
                    key: key.to_vec().into_boxed_slice(),
                    count: 1,
                });
                self.unique += 1;
                counters.record_unique_entry();
                return;
            }
            // Step: upgrade to hashed mode, reinserting every inline entry.
            trace!(inline_entries = inline.len(), "hash table upgrading inline to hashed mode");
            let drained: ArrayVec<Bucket, N_INLINE> = std::mem::replace(inline, ArrayVec::new());
            let mut indirect: Vec<Vec<Bucket>> = Vec::with_capacity(TABLE_SIZE);
            indirect.resize_with(TABLE_SIZE, Vec::new);
            for bucket in drained {
                let h = jenkins_hash(&bucket.key) as usize & (TABLE_SIZE - 1);
                indirect[h].push(bucket);
            }
            counters.record_alloc();
            self.mode = Mode::Hashed(indirect.into_boxed_slice());
        }

        let Mode::Hashed(indirect) = &mut self.mode else {
            unreachable!("just upgraded to hashed mode above")
        };
        let h = jenkins_hash(key) as usize & (TABLE_SIZE - 1);
        let chain = &mut indirect[h];
        if let Some(bucket) = chain.iter_mut().find(|b| &*b.key == key) {
            bucket.count += 1;
            self.hits += 1;
        } else {
            counters.record_alloc();
            chain.push(Bucket {
                key: key.to_vec().into_boxed_slice(),
                count: 1,
            });
            self.unique += 1;
            counters.record_unique_entry();
        }
    }

    /// `(full_matches, cumulative_count)` for the `Stats` fold, analogous to
    /// the ART backend: every insert terminates at exactly one bucket, so
    /// the two totals are always equal.
    pub fn stats(&self) -> (u64, u64) {
        let total = match &self.mode {
            Mode::Inline(inline) => inline.iter().map(|b| b.count).sum(),
            Mode::Hashed(indirect) => indirect
                .iter()
                .flat_map(|chain| chain.iter())
                .map(|b| b.count)
                .sum(),
        };
        (total, total)
    }

    pub fn lookup(&self, frames: &[Frame]) -> Option<u64> {
        let key = byte_stream(frames);
        match &self.mode {
            Mode::Inline(inline) => inline.iter().find(|b| &*b.key == key).map(|b| b.count),
            Mode::Hashed(indirect) => {
                let h = jenkins_hash(key) as usize & (TABLE_SIZE - 1);
                indirect[h].iter().find(|b| &*b.key == key).map(|b| b.count)
            }
        }
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self.mode, Mode::Hashed(_))
    }

    pub fn unique_count(&self) -> u64 {
        self.unique
    }

    pub fn hit_count(&self) -> u64 {
        self.hits
    }
}

/// Jenkins' one-at-a-time hash (`spec.md` §4.3 "a 32-bit Jenkins hash").
fn jenkins_hash(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0;
    for &b in bytes {
        hash = hash.wrapping_add(b as u32);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().map(|&b| Frame::new(b as u64, 0)).collect()
    }

    #[test]
    fn s6_four_distinct_keys_overflow_inline_into_hashed_mode() {
        let mut table = Table::new();
        let mut counters = Counters::new();
        let keys = ["fubar", "foobar", "fibar", "fabar"];
        for k in &keys {
            table.insert(&key(k.as_bytes()), &mut counters);
        }
        assert!(table.is_hashed());
        for k in &keys {
            assert_eq!(table.lookup(&key(k.as_bytes())), Some(1));
        }
    }

    #[test]
    fn repeats_increment_the_same_bucket_before_and_after_overflow() {
        let mut table = Table::new();
        let mut counters = Counters::new();
        let a = key(b"fubar");
        let b = key(b"foobar");
        let c = key(b"fibar");
        let d = key(b"fabar");
        for _ in 0..4 {
            table.insert(&a, &mut counters);
        }
        table.insert(&b, &mut counters);
        table.insert(&c, &mut counters);
        table.insert(&d, &mut counters);
        table.insert(&a, &mut counters);
        assert_eq!(table.lookup(&a), Some(5));
        assert_eq!(table.lookup(&b), Some(1));
    }

    #[test]
    fn count_conservation_after_mixed_inserts() {
        let mut table = Table::new();
        let mut counters = Counters::new();
        let k1 = key(b"aaaaa");
        let k2 = key(b"bbbbb");
        let k3 = key(b"ccccc");
        for _ in 0..5 {
            table.insert(&k1, &mut counters);
        }
        for _ in 0..3 {
            table.insert(&k2, &mut counters);
        }
        for _ in 0..7 {
            table.insert(&k3, &mut counters);
        }
        let (full, cumulative) = table.stats();
        assert_eq!(full, cumulative);
        assert_eq!(full, 15);
        assert_eq!(table.lookup(&k1), Some(5));
        assert_eq!(table.lookup(&k2), Some(3));
        assert_eq!(table.lookup(&k3), Some(7));
    }

    #[test]
    fn jenkins_hash_is_deterministic() {
        assert_eq!(jenkins_hash(b"hello"), jenkins_hash(b"hello"));
        assert_ne!(jenkins_hash(b"hello"), jenkins_hash(b"world"));
    }
}
