//! Tracklog engine: the four core operations over an injected store handle
//!
//! Each operation (write, query, update, delete) is an independent,
//! stateless request-response unit; the engine holds no mutable state of its
//! own and delegates all coordination to the store's per-key atomic
//! operations. A single long-lived [`Store`] handle is constructed once at
//! process start and passed in explicitly - never reached through ambient
//! singletons.
//!
//! [`Store`]: tracklog_core::traits::Store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
mod log;
mod update;

pub use log::{QueryPage, QueryRequest, TimeLog, WriteReceipt, WriteRequest};
pub use update::UpdateRequest;
