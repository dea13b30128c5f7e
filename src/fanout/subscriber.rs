//! # In-process subscriber trait.
//!
//! `Subscribe` is the extension point for consumers that live inside the
//! process (loggers, metrics, cache invalidation). Each attached
//! implementation is driven by a dedicated worker loop fed from its own
//! bounded queue, so a slow implementation never blocks the publisher or
//! other subscribers.
//!
//! External consumers (WebSocket sessions and the like) do not implement
//! this trait; they hold a
//! [`SubscriberHandle`](crate::fanout::SubscriberHandle) and drain it
//! themselves.

use async_trait::async_trait;

use super::notice::Notice;

/// Contract for in-process notice consumers.
///
/// Called from a subscriber-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single notice.
    async fn on_notice(&self, notice: &Notice);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow the subscriber is disconnected, same as any external
    /// one. `0` means "use the broadcaster's configured default".
    fn queue_capacity(&self) -> usize {
        0
    }
}
