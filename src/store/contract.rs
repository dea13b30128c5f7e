//! # Storage contract consumed by the admission and scoring layers.
//!
//! The contract offers **one** way to create a registration
//! ([`EventStore::try_reserve`]) and **one** way to cancel it
//! ([`EventStore::release`]), each a single atomic call. There is no
//! separate "check capacity" read: checking and inserting in two calls
//! admits overbooking between them.
//!
//! ## Atomicity requirements
//! - `try_reserve` verifies the event exists and is not cancelled, rejects
//!   duplicates per `(event, user)`, and increments `reserved_count` only
//!   while `reserved_count < capacity` — all in one step, linearizable per
//!   event.
//! - `release` flips a confirmed registration to cancelled and decrements
//!   the owning event's `reserved_count` by exactly one, in one step.
//! - Plain reads carry no freshness guarantee beyond "a consistent recent
//!   state"; they never block the mutating path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Event, EventId, Registration, RegistrationId, UserIdentity};

/// Transient storage failure.
///
/// Outcome-level conditions (full, duplicate, missing) are **not** errors;
/// they are [`ReserveOutcome`]/[`ReleaseOutcome`] variants. `StoreError` is
/// reserved for infrastructure faults a caller may retry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Result of one atomic reservation attempt.
#[derive(Debug, Clone)]
pub enum ReserveOutcome {
    /// Seat reserved. Carries the created registration and the event
    /// snapshot taken *after* the increment, inside the same critical
    /// section — the admission layer derives the occupancy crossing from
    /// it without a second read.
    Reserved {
        registration: Registration,
        event: Event,
    },
    /// The user already holds a confirmed registration for this event.
    AlreadyRegistered,
    /// `reserved_count` was already at capacity.
    Full {
        /// The event's configured capacity.
        capacity: u32,
    },
    /// No such event.
    NotFound,
    /// The event is in the terminal cancelled state.
    Cancelled,
}

/// Result of one atomic release attempt.
#[derive(Debug, Clone)]
pub enum ReleaseOutcome {
    /// Registration cancelled, owning event decremented by one.
    Released {
        /// The owning event.
        event_id: EventId,
    },
    /// The registration was already cancelled.
    AlreadyReleased,
    /// No such registration.
    NotFound,
}

/// Persistent record of events and registrations.
///
/// Implementations must serialize `try_reserve`/`release` per event and
/// keep the invariant that `reserved_count` equals the number of confirmed
/// registrations after every call.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Atomically reserves a seat for `user` on `event_id`.
    ///
    /// Duplicate check, capacity check, registration insert, and counter
    /// increment are one step; concurrent calls for the same event observe
    /// some sequential order.
    async fn try_reserve(
        &self,
        event_id: EventId,
        user: UserIdentity,
    ) -> Result<ReserveOutcome, StoreError>;

    /// Atomically cancels `registration_id` and decrements the owning
    /// event's `reserved_count` by one.
    ///
    /// A second release of the same registration reports
    /// [`ReleaseOutcome::AlreadyReleased`].
    async fn release(
        &self,
        registration_id: RegistrationId,
    ) -> Result<ReleaseOutcome, StoreError>;

    /// Reads one event snapshot.
    async fn get(&self, event_id: EventId) -> Result<Option<Event>, StoreError>;

    /// Lists `Upcoming` events with `start_time > now`.
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError>;

    /// Lists every event regardless of status (analytics read).
    async fn list_all(&self) -> Result<Vec<Event>, StoreError>;

    /// Full registration history for a user, confirmed and cancelled.
    async fn history(&self, user: UserIdentity) -> Result<Vec<Registration>, StoreError>;

    /// Number of confirmed registrations for an event.
    ///
    /// Equals the event's `reserved_count` by invariant; exposed as a read
    /// so consumers do not depend on the counter being denormalized.
    async fn confirmed_count(&self, event_id: EventId) -> Result<u32, StoreError>;
}
