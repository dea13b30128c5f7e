//! Error types surfaced by the admission, scoring, and fan-out layers.
//!
//! Every fallible operation returns one of these enums synchronously; the
//! crate performs no internal retries and never uses panics for control
//! flow. Retry policy, if any, belongs to the calling layer.
//!
//! - [`AdmissionError`] — registration/cancellation and capacity guards.
//! - [`ScoringError`] — read-path failures while building a ranking.
//! - [`FanoutError`] — subscriber registration against a closed broadcaster.
//!
//! All types provide `as_label()` for stable snake_case identifiers in
//! logs/metrics.

use thiserror::Error;

use crate::domain::{EventId, RegistrationId};
use crate::store::StoreError;

/// # Errors produced by admission operations.
///
/// These cover precondition failures (missing or cancelled records),
/// invariant denials (capacity, duplicates), and transient infrastructure
/// failures. Only [`AdmissionError::StorageUnavailable`] is retryable.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The referenced event does not exist.
    #[error("event {event_id} not found")]
    EventNotFound {
        /// The missing event.
        event_id: EventId,
    },

    /// The referenced registration does not exist.
    #[error("registration {registration_id} not found")]
    RegistrationNotFound {
        /// The missing registration.
        registration_id: RegistrationId,
    },

    /// The event is in the terminal `Cancelled` state; no reservation
    /// changes are permitted.
    #[error("event {event_id} is cancelled")]
    EventCancelled {
        /// The cancelled event.
        event_id: EventId,
    },

    /// The registration was already cancelled; a second cancel is reported,
    /// not silently accepted.
    #[error("registration {registration_id} is already cancelled")]
    AlreadyCancelled {
        /// The already-cancelled registration.
        registration_id: RegistrationId,
    },

    /// The event is at full capacity.
    #[error("event {event_id} is at full capacity ({capacity})")]
    CapacityExceeded {
        /// The full event.
        event_id: EventId,
        /// Its configured capacity.
        capacity: u32,
    },

    /// The caller already holds a confirmed registration for this event.
    #[error("already registered for event {event_id}")]
    DuplicateRegistration {
        /// The event in question.
        event_id: EventId,
    },

    /// A capacity change would drop below the current reserved count
    /// (or to zero).
    #[error("capacity {requested} is below reserved count {reserved}")]
    InvalidCapacity {
        /// The requested new capacity.
        requested: u32,
        /// The current number of confirmed registrations.
        reserved: u32,
    },

    /// The storage operation failed or exceeded its bounded timeout.
    ///
    /// This is a transient infrastructure failure, never a capacity
    /// denial.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Human-readable cause.
        reason: String,
    },
}

impl AdmissionError {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            AdmissionError::EventNotFound { .. } => "event_not_found",
            AdmissionError::RegistrationNotFound { .. } => "registration_not_found",
            AdmissionError::EventCancelled { .. } => "event_cancelled",
            AdmissionError::AlreadyCancelled { .. } => "already_cancelled",
            AdmissionError::CapacityExceeded { .. } => "capacity_exceeded",
            AdmissionError::DuplicateRegistration { .. } => "duplicate_registration",
            AdmissionError::InvalidCapacity { .. } => "invalid_capacity",
            AdmissionError::StorageUnavailable { .. } => "storage_unavailable",
        }
    }

    /// True only for transient failures where a retry by the caller may
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AdmissionError::StorageUnavailable { .. })
    }
}

impl From<StoreError> for AdmissionError {
    fn from(err: StoreError) -> Self {
        AdmissionError::StorageUnavailable {
            reason: err.to_string(),
        }
    }
}

/// # Errors produced by the read-only scoring path.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    /// The source event for a similarity query does not exist.
    #[error("event {event_id} not found")]
    EventNotFound {
        /// The missing event.
        event_id: EventId,
    },

    /// A storage read failed.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Human-readable cause.
        reason: String,
    },
}

impl ScoringError {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScoringError::EventNotFound { .. } => "event_not_found",
            ScoringError::StorageUnavailable { .. } => "storage_unavailable",
        }
    }
}

impl From<StoreError> for ScoringError {
    fn from(err: StoreError) -> Self {
        ScoringError::StorageUnavailable {
            reason: err.to_string(),
        }
    }
}

/// # Errors produced by the fan-out subscriber surface.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutError {
    /// The broadcaster has been shut down and accepts no new subscribers.
    #[error("broadcaster is closed")]
    Closed,
}

impl FanoutError {
    /// Returns a short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FanoutError::Closed => "broadcaster_closed",
        }
    }
}
