//! # Registration (RSVP) record.
//!
//! A [`Registration`] ties a resolved [`UserIdentity`] to an event. At most
//! one `Confirmed` registration may exist per `(event, user)` pair; the
//! store's atomic reserve operation enforces this together with the
//! capacity bound.
//!
//! Registrations are never deleted: cancellation flips the status to
//! `Cancelled` and decrements the owning event's `reserved_count` in the
//! same atomic step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::EventId;

/// Opaque registration identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque resolved user identity.
///
/// Identity resolution (email, SSO, ...) happens outside this crate; the
/// admission and scoring layers only ever see this handle, never raw
/// credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(Uuid);

impl UserIdentity {
    /// Generates a fresh random identity (tests and demos).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

/// A user's seat at an event.
///
/// Created only through the admission layer; cancelled (never deleted)
/// only through it as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Opaque identifier.
    pub id: RegistrationId,
    /// Owning event (reference, not ownership).
    pub event_id: EventId,
    /// Resolved identity of the registrant.
    pub user: UserIdentity,
    /// Current status.
    pub status: RegistrationStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Registration {
    /// Creates a fresh `Confirmed` registration.
    pub(crate) fn confirmed(event_id: EventId, user: UserIdentity, at: DateTime<Utc>) -> Self {
        Self {
            id: RegistrationId::new(),
            event_id,
            user,
            status: RegistrationStatus::Confirmed,
            created_at: at,
        }
    }

    /// True while the registration still holds a seat.
    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }
}
