//! The CLI entry point (`spec.md` §6, `SPEC_FULL.md` §6.1/§6.2).
//!
//! `<prog> {linux|art|hash}`: exactly one positional argument, no flags, no
//! options. Parsed with `clap`'s derive API so arity and the backend-name
//! enum are validated the ecosystem way rather than hand-rolled, but the
//! contract's exit code (1, not `clap`'s own usage-error code 2) is
//! enforced by catching the parse error at this boundary — the one
//! recoverable error kind in the whole system (`spec.md` §7).

use std::ffi::OsString;
use std::fmt;

use clap::{Parser, ValueEnum};
use itertools::Itertools;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

use crate::backend::BackendKind;
use crate::dispatch::Dispatcher;
use crate::record::RecordSource;

#[derive(Parser, Debug)]
#[command(name = "calltrie", about = "A callstack aggregation index for profiler samples.")]
struct Args {
    /// Backend implementation every sample is routed through.
    backend: BackendKind,
}

/// The CLI's own error type, matching the teacher's hand-rolled
/// `Debug`-derive-plus-manual-`Display`/`Error` style (`src/repo.rs`'s
/// `CreateCommitError`/`PushError`) rather than `thiserror`, which the
/// teacher never depends on.
#[derive(Debug)]
pub enum CliError {
    /// The positional argument was missing, extra, or not one of
    /// `linux`/`art`/`hash` (`spec.md` §6 "Any other value — exit code 1").
    InvalidUsage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidUsage(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {}

/// Parses the CLI's one prescribed positional argument. `args` includes the
/// program name in position 0, matching `std::env::args()`'s own shape.
pub fn parse<I, T>(args: I) -> Result<BackendKind, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args)
        .map(|parsed| parsed.backend)
        .map_err(|err| CliError::InvalidUsage(usage_message(&err)))
}

fn usage_message(err: &clap::Error) -> String {
    let valid = BackendKind::value_variants().iter().map(|b| b.as_str()).join(", ");
    for (kind, value) in err.context() {
        if kind == clap::error::ContextKind::InvalidValue {
            if let clap::error::ContextValue::String(s) = value {
                return format!("unknown backend '{s}', expected one of: {valid}");
            }
        }
    }
    format!("expected exactly one backend argument, one of: {valid}")
}

/// Installs a `tracing-subscriber` `EnvFilter`-driven subscriber, defaulting
/// to `info` when `RUST_LOG` is unset (`SPEC_FULL.md` §6.2). Safe to call
/// more than once in a process (e.g. across tests); later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Drives every record from `source` through a fresh [`Dispatcher`] for
/// `backend`, then prints the prescribed stats block to stdout (`spec.md`
/// §6). Logging is a side channel (`debug`-level tree creation, `trace`
/// level backend growth events logged from within the backends
/// themselves) — the stdout block is the one output contract.
pub fn run(backend: BackendKind, source: &impl RecordSource) {
    trace!(backend = backend.as_str(), "starting run");
    let mut dispatcher = Dispatcher::new(backend);
    dispatcher.process_all(source.records());
    debug!(trees = dispatcher.tree_count(), "run complete");
    print_stats_block(&dispatcher);
}

fn print_stats_block(dispatcher: &Dispatcher) {
    let stats = dispatcher.stats();
    let counters = dispatcher.counters();
    println!("Processed {} records", dispatcher.records_processed());
    println!("Created {} trees", dispatcher.tree_count());
    println!("Average 100% matches: {:.0}%", stats.average_full_match_percent());
    println!("Number of maps: {}", dispatcher.map_count());
    println!("Number of allocations: {}", counters.num_allocs);
    println!("Number of free:        {}", counters.num_frees);
    println!("Number of LEAF frees:  {}", counters.leaf_frees);
    println!("Max tree depth: {}", counters.max_depth);
}
