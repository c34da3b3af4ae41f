//! The record source (`spec.md` §6 "Record source", `SPEC_FULL.md` §6.3).
//!
//! `spec.md` §1 treats the profiler record source as an opaque external
//! collaborator: the core only needs an iterator of [`Record`]. The built-in
//! [`Records`] table mirrors `original_source/src/main.c`'s static `records[]`
//! array (an in-process table of fixed sample records) closely enough to
//! drive the CLI, but any iterator of `Record` — including one built by a
//! test from a handful of literal samples — satisfies [`RecordSource`].

use crate::frame::{Frame, MAX_FRAMES};

/// One profiler sample: a stream-id plus its frames, already truncated at
/// the `ip == 0` sentinel (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub frames: Vec<Frame>,
}

impl Record {
    /// Builds a record from a stream-id and a sentinel-terminated (or
    /// unterminated, if already at capacity) frame slice, truncating at the
    /// first `ip == 0` frame per `spec.md` §3.
    pub fn new(id: u64, frames: &[Frame]) -> Self {
        let len = frames
            .iter()
            .position(|f| f.is_sentinel())
            .unwrap_or(frames.len())
            .min(MAX_FRAMES);
        Record {
            id,
            frames: frames[..len].to_vec(),
        }
    }
}

/// An opaque source of records, in source order (`spec.md` §6). The core
/// never looks past this trait: no parsing, no format, no external I/O.
pub trait RecordSource {
    fn records(&self) -> Box<dyn Iterator<Item = Record> + '_>;
}

/// A small in-process table of sample records, standing in for the
/// profiler's own record source (`original_source/src/main.c`'s static
/// `records[]`). Not exhaustive of any real workload — just enough shape to
/// drive the CLI end to end.
pub struct Records {
    records: Vec<Record>,
}

impl Records {
    pub fn new(records: Vec<Record>) -> Self {
        Records { records }
    }

    /// The built-in sample table: a handful of streams, some sharing
    /// callstack prefixes, mirroring the kind of fixture
    /// `original_source/src/main.c`'s historical revisions hardcoded.
    pub fn builtin() -> Self {
        let frame = Frame::new;
        let sentinel = Frame::new(0, 0);
        let mk = |id: u64, frames: &[Frame]| -> Record {
            let mut full = frames.to_vec();
            full.push(sentinel);
            Record::new(id, &full)
        };
        let records = vec![
            mk(1, &[frame(0x1000, 1), frame(0x2000, 1), frame(0x3000, 1)]),
            mk(1, &[frame(0x1000, 1), frame(0x2000, 1), frame(0x3000, 1)]),
            mk(1, &[frame(0x1000, 1), frame(0x2000, 1), frame(0x4000, 1)]),
            mk(2, &[frame(0x1000, 1), frame(0x5000, 2)]),
            mk(2, &[frame(0x1000, 1), frame(0x5000, 2), frame(0x6000, 2)]),
            mk(3, &[frame(0x7000, 3)]),
        ];
        Records::new(records)
    }
}

impl RecordSource for Records {
    fn records(&self) -> Box<dyn Iterator<Item = Record> + '_> {
        Box::new(self.records.iter().cloned())
    }
}
