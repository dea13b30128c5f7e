//! # AdmissionController: the write path for registrations.
//!
//! Every registration and cancellation funnels through here. The
//! controller performs **one** atomic storage call per operation, bounded
//! by [`Config::storage_timeout`], then hands the finished notice to the
//! bus and returns — it never waits for fan-out delivery.
//!
//! ## Flow
//! ```text
//! register(event, user)
//!     │
//!     ├─► store.try_reserve(event, user)      (single atomic step, bounded)
//!     │       ├─ Reserved ──► publish registration.created
//!     │       │               └─ occupancy crossed threshold upward?
//!     │       │                     └─ publish capacity.warning (once per crossing)
//!     │       ├─ AlreadyRegistered ──► Err(DuplicateRegistration)
//!     │       ├─ Full ──────────────► Err(CapacityExceeded)
//!     │       ├─ NotFound ──────────► Err(EventNotFound)
//!     │       └─ Cancelled ─────────► Err(EventCancelled)
//!     └─ timeout/store fault ───────► Err(StorageUnavailable)
//! ```
//!
//! ## Rules
//! - Linearizable per event: with R seats remaining and N concurrent
//!   registrations, exactly `min(N, R)` succeed.
//! - The capacity warning fires only on the admission whose increment
//!   crosses the threshold; staying above it stays silent, and dropping
//!   below re-arms it. The crossing is derived from the (before, after)
//!   pair observed inside the atomic step, so concurrent admissions cannot
//!   double-fire it.
//! - Notification failures never fail or delay the admission that
//!   triggered them.

use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::{EventId, Registration, RegistrationId, UserIdentity};
use crate::error::AdmissionError;
use crate::fanout::{Bus, Notice};
use crate::store::{EventStore, ReleaseOutcome, ReserveOutcome, StoreError};

/// Enforces capacity and duplicate invariants, then notifies.
///
/// Construct once and share; all methods take `&self`.
pub struct AdmissionController {
    store: Arc<dyn EventStore>,
    bus: Bus,
    storage_timeout: Option<std::time::Duration>,
    warn_threshold: f64,
}

impl AdmissionController {
    /// Creates a controller over `store`, publishing notices into `bus`.
    pub fn new(store: Arc<dyn EventStore>, bus: Bus, cfg: &Config) -> Self {
        Self {
            store,
            bus,
            storage_timeout: cfg.storage_timeout_opt(),
            warn_threshold: cfg.warn_threshold_clamped(),
        }
    }

    /// Admits `user` to `event_id`, returning the created registration.
    ///
    /// # Errors
    /// - [`AdmissionError::EventNotFound`] — no such event
    /// - [`AdmissionError::EventCancelled`] — the event is terminal
    /// - [`AdmissionError::CapacityExceeded`] — no seats left
    /// - [`AdmissionError::DuplicateRegistration`] — the user already holds
    ///   a confirmed seat
    /// - [`AdmissionError::StorageUnavailable`] — transient store fault or
    ///   timeout; retrying is the caller's decision
    pub async fn register(
        &self,
        event_id: EventId,
        user: UserIdentity,
    ) -> Result<Registration, AdmissionError> {
        let outcome = self
            .bounded(self.store.try_reserve(event_id, user))
            .await?;

        match outcome {
            ReserveOutcome::Reserved {
                registration,
                event,
            } => {
                self.bus
                    .publish(Notice::registration_created(&registration, &event));

                // `event` is the post-increment snapshot from inside the
                // atomic step; the admission that crossed the threshold is
                // exactly the one whose `before` was still under it.
                let before = event.reserved_count.saturating_sub(1);
                if crossed_upward(before, event.reserved_count, event.capacity, self.warn_threshold)
                {
                    tracing::info!(
                        event = %event.id,
                        reserved = event.reserved_count,
                        capacity = event.capacity,
                        "occupancy crossed warning threshold",
                    );
                    self.bus.publish(Notice::capacity_warning(&event));
                }

                Ok(registration)
            }
            ReserveOutcome::AlreadyRegistered => {
                Err(AdmissionError::DuplicateRegistration { event_id })
            }
            ReserveOutcome::Full { capacity } => Err(AdmissionError::CapacityExceeded {
                event_id,
                capacity,
            }),
            ReserveOutcome::NotFound => Err(AdmissionError::EventNotFound { event_id }),
            ReserveOutcome::Cancelled => Err(AdmissionError::EventCancelled { event_id }),
        }
    }

    /// Cancels a confirmed registration, freeing its seat.
    ///
    /// Idempotency is reported, not silent: a second cancel returns
    /// [`AdmissionError::AlreadyCancelled`].
    pub async fn cancel(&self, registration_id: RegistrationId) -> Result<(), AdmissionError> {
        let outcome = self
            .bounded(self.store.release(registration_id))
            .await?;

        match outcome {
            ReleaseOutcome::Released { event_id } => {
                self.bus
                    .publish(Notice::registration_cancelled(registration_id, event_id));
                Ok(())
            }
            ReleaseOutcome::AlreadyReleased => {
                Err(AdmissionError::AlreadyCancelled { registration_id })
            }
            ReleaseOutcome::NotFound => {
                Err(AdmissionError::RegistrationNotFound { registration_id })
            }
        }
    }

    /// Guard for the surrounding CRUD layer: may `event_id`'s capacity be
    /// set to `new_capacity`?
    ///
    /// Shrinking below the current reserved count would orphan confirmed
    /// seats; zero capacity is likewise rejected.
    pub async fn validate_capacity(
        &self,
        event_id: EventId,
        new_capacity: u32,
    ) -> Result<(), AdmissionError> {
        let event = self
            .store
            .get(event_id)
            .await?
            .ok_or(AdmissionError::EventNotFound { event_id })?;

        if new_capacity == 0 || new_capacity < event.reserved_count {
            return Err(AdmissionError::InvalidCapacity {
                requested: new_capacity,
                reserved: event.reserved_count,
            });
        }
        Ok(())
    }

    /// Applies the configured bound to one storage operation.
    ///
    /// Elapsed timeout is a transient failure, never a capacity denial.
    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AdmissionError> {
        match self.storage_timeout {
            Some(limit) => match tokio::time::timeout(limit, op).await {
                Ok(result) => result.map_err(AdmissionError::from),
                Err(_elapsed) => Err(AdmissionError::StorageUnavailable {
                    reason: format!("storage operation exceeded {limit:?}"),
                }),
            },
            None => op.await.map_err(AdmissionError::from),
        }
    }
}

/// True iff the occupancy ratio moves from below `threshold` to at or
/// above it when `before` becomes `after`.
fn crossed_upward(before: u32, after: u32, capacity: u32, threshold: f64) -> bool {
    let capacity = f64::from(capacity.max(1));
    (f64::from(before) / capacity) < threshold && (f64::from(after) / capacity) >= threshold
}
