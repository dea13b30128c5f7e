//! # Internal notice bus.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that carries
//! finished [`Notice`]s from their producers (the admission controller, the
//! surrounding CRUD layer) to the broadcaster's bridge task.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails
//!   toward the caller; delivery is fire-and-forget.
//! - **Bounded capacity**: a single ring buffer stores recent notices for
//!   all receivers; a lagging receiver observes `RecvError::Lagged(n)` and
//!   skips the `n` oldest items.
//! - **No persistence**: notices published while no receiver exists are
//!   dropped.

use tokio::sync::broadcast;

use super::notice::Notice;

/// Broadcast channel for domain notices.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); hand a clone
/// to every producer and keep one to build receivers from.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Notice>,
}

impl Bus {
    /// Creates a new bus with the given ring-buffer capacity (min 1,
    /// clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Notice>(capacity);
        Self { tx }
    }

    /// Publishes a notice to all active receivers.
    ///
    /// Takes ownership; the channel clones per receiver. With no receivers
    /// the notice is dropped and this still returns immediately.
    pub fn publish(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    /// Creates an independent receiver observing subsequent notices only.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}
