//! Event storage: the atomic reservation contract and its in-memory
//! implementation.
//!
//! ## Contents
//! - [`EventStore`] — the contract the admission layer consumes. Its two
//!   mutating operations, [`EventStore::try_reserve`] and
//!   [`EventStore::release`], are single atomic calls: capacity check,
//!   duplicate check, and row creation happen in one step, serialized per
//!   event.
//! - [`MemoryStore`] — reference implementation with one lock per event;
//!   operations on different events never contend.
//!
//! A database-backed implementation satisfies the same contract with a
//! conditional update inside one transaction; any backend works as long as
//! per-event linearizability holds and cross-event operations stay
//! independent.

mod contract;
mod memory;

pub use contract::{EventStore, ReleaseOutcome, ReserveOutcome, StoreError};
pub use memory::MemoryStore;
