//! Domain data model: events, registrations, and their identifiers.
//!
//! This module groups the persistent record types shared by the admission,
//! scoring, and fan-out layers:
//! - [`Event`], [`Category`], [`EventStatus`] — the schedulable unit
//! - [`Registration`], [`RegistrationStatus`] — a user's confirmed seat
//! - [`EventId`], [`RegistrationId`], [`UserIdentity`] — opaque identifiers
//!
//! ## Invariant
//! For every event, `reserved_count` equals the number of `Confirmed`
//! registrations referencing it. Only the store's atomic reserve/release
//! operations may move `reserved_count`.

mod event;
mod registration;

pub use event::{Category, Event, EventId, EventPatch, EventStatus};
pub use registration::{Registration, RegistrationId, RegistrationStatus, UserIdentity};
