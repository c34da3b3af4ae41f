//! A callstack aggregation index for profiler samples.
//!
//! A sample is a `(stream-id, frames)` pair; frames are `(ip, map)` pairs of
//! machine words terminated by an `ip == 0` sentinel. Samples are routed by
//! stream-id to a per-stream tree (see [`dispatch`]) and folded into that
//! tree by one of three interchangeable backends (see [`backend`]): an
//! adaptive radix tree, a two-tier hash table, or a linux-style sibling
//! callchain tree. The index supports exactly one mutating operation,
//! `insert`, plus a read-only statistics snapshot.

pub mod backend;
pub mod cli;
pub mod counters;
pub mod dispatch;
pub mod frame;
pub mod interner;
pub mod record;
pub mod stats;

pub use backend::{Backend, BackendKind};
pub use counters::Counters;
pub use dispatch::Dispatcher;
pub use frame::{Frame, MAX_FRAMES};
pub use interner::MapInterner;
pub use record::{Record, RecordSource};
pub use stats::Stats;

#[cfg(test)]
mod tests {}
