//! In-memory reference implementation of the Tracklog store contract
//!
//! The production store is an external service; this crate provides a
//! `BTreeMap`-backed [`MemoryStore`] with identical semantics - per-key
//! atomic guards, a `(stream_id, sort_key)` secondary index, and
//! continuation positions - so the engine is exercisable end to end without
//! network access.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;

pub use memory::MemoryStore;
