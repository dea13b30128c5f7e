//! # Global configuration.
//!
//! Provides [`Config`] — centralized settings for the admission layer and
//! the fan-out broadcaster.
//!
//! Config is used in two ways:
//! 1. **Controller creation**: `AdmissionController::new(store, bus, &config)`
//! 2. **Broadcaster creation**: `FanoutBroadcaster::new(&config)`
//!
//! ## Sentinel values
//! - `storage_timeout = 0s` → no timeout (treated as `None` by
//!   [`Config::storage_timeout_opt`])
//! - `grace = 0s` → shutdown abandons in-flight deliveries immediately

use std::time::Duration;

/// Default occupancy ratio above which a capacity warning is published.
pub const DEFAULT_WARN_THRESHOLD: f64 = 0.90;

/// Global configuration for the event core.
///
/// Defines:
/// - **Notification plumbing**: bus capacity, per-subscriber queue bound
/// - **Storage discipline**: bounded timeout for the atomic reserve/release
/// - **Warning semantics**: occupancy threshold for `capacity.warning`
/// - **Shutdown behavior**: grace period for draining deliveries
///
/// ## Field semantics
/// - `bus_capacity`: notice bus ring buffer size (min 1; clamped)
/// - `subscriber_queue`: per-subscriber delivery queue bound (min 1; clamped)
/// - `storage_timeout`: per-operation bound on the atomic storage call
///   (`0s` = no bound)
/// - `warn_threshold`: occupancy ratio in `(0, 1]` that arms the capacity
///   warning
/// - `grace`: maximum wait for attached subscriber workers to drain on
///   shutdown
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the internal notice bus ring buffer.
    ///
    /// Slow bridge consumers that lag behind more than `bus_capacity`
    /// notices observe `Lagged` and skip older items. Minimum 1 (clamped).
    pub bus_capacity: usize,

    /// Bound of each subscriber's delivery queue.
    ///
    /// A subscriber whose queue is full at publish time is disconnected
    /// rather than allowed to backpressure the publisher. Minimum 1
    /// (clamped).
    pub subscriber_queue: usize,

    /// Bound on each atomic storage operation.
    ///
    /// - `Duration::ZERO` = no bound
    /// - `> 0` = elapsed timeout surfaces as `StorageUnavailable`
    pub storage_timeout: Duration,

    /// Occupancy ratio that triggers `capacity.warning` on upward crossing.
    ///
    /// Values outside `(0, 1]` are clamped by [`Config::warn_threshold_clamped`].
    pub warn_threshold: f64,

    /// Maximum wait for subscriber workers to drain during shutdown.
    pub grace: Duration,
}

impl Config {
    /// Returns the storage timeout as an `Option`.
    ///
    /// - `None` → no bound
    /// - `Some(d)` → timeout applied per atomic operation
    #[inline]
    pub fn storage_timeout_opt(&self) -> Option<Duration> {
        if self.storage_timeout == Duration::ZERO {
            None
        } else {
            Some(self.storage_timeout)
        }
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the per-subscriber queue bound clamped to a minimum of 1.
    #[inline]
    pub fn subscriber_queue_clamped(&self) -> usize {
        self.subscriber_queue.max(1)
    }

    /// Returns the warning threshold clamped into `(0, 1]`.
    #[inline]
    pub fn warn_threshold_clamped(&self) -> f64 {
        if !self.warn_threshold.is_finite() || self.warn_threshold <= 0.0 {
            DEFAULT_WARN_THRESHOLD
        } else {
            self.warn_threshold.min(1.0)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `subscriber_queue = 256`
    /// - `storage_timeout = 5s`
    /// - `warn_threshold = 0.90`
    /// - `grace = 10s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            subscriber_queue: 256,
            storage_timeout: Duration::from_secs(5),
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            grace: Duration::from_secs(10),
        }
    }
}
