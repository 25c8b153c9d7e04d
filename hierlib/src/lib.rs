//! # HierLib
//!
//! Hierlib is a library for simulating multi-level memory cache hierarchies
//!
//! It replays a trace of read/write operations against a configurable chain of
//! set-associative cache levels terminated by main memory, reproducing the
//! hit/miss, eviction, write-back, and inclusion behaviour real hardware would
//! exhibit. Block size, per-level capacity and associativity, the replacement
//! policy (FIFO, LRU, or lookahead-optimal), and the inclusion policy are all
//! configurable.
//!
//! Only dirty/clean status is modelled; block contents and timing are not.

/// Contains address decomposition for a given level geometry
pub mod address;

/// Contains the cache line, set, and level implementations
pub mod cache;

/// Contains definitions for the JSON input format
pub mod config;

/// Contains the hierarchy which links levels together, replays traces, and
/// aggregates statistics
pub mod hierarchy;

/// Contains helpers for reading trace files
pub mod io;

/// Contains the observer trait used to surface simulation events without
/// coupling the core to any output format
pub mod observer;

/// Contains the provided replacement policies, with a trait for implementing
/// custom replacement policies
pub mod replacement_policies;

/// Contains the trace entry type and the trace text parser
pub mod trace;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
