//! # In-memory store with one lock per event.
//!
//! [`MemoryStore`] keeps each event and its registrations inside a single
//! per-event `Mutex`; the outer map is only touched to look slots up or to
//! add/remove events. The per-event lock is the serialization point the
//! reservation contract requires:
//!
//! ```text
//! try_reserve(E1, ..)  ─┐
//! try_reserve(E1, ..)  ─┼──► lock(slot E1) ──► check + insert + increment
//! release(reg on E1)   ─┘         (one at a time)
//!
//! try_reserve(E2, ..)  ────► lock(slot E2)    (never waits on E1)
//! ```
//!
//! ## Rules
//! - Duplicate check, capacity check, insert, and increment happen inside
//!   one critical section; no observer sees a half-applied reservation.
//! - Operations on different events take different locks and proceed
//!   independently.
//! - The registration→event index is written after the slot lock is
//!   released; the id is not observable by callers until `try_reserve`
//!   returns, so the window is unreachable.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    Event, EventId, EventPatch, EventStatus, Registration, RegistrationId, RegistrationStatus,
    UserIdentity,
};

use super::contract::{EventStore, ReleaseOutcome, ReserveOutcome, StoreError};

/// One event plus everything reserved against it.
struct EventSlot {
    event: Event,
    registrations: HashMap<RegistrationId, Registration>,
    /// Confirmed registrations only; the duplicate guard.
    by_user: HashMap<UserIdentity, RegistrationId>,
}

impl EventSlot {
    fn new(event: Event) -> Self {
        Self {
            event,
            registrations: HashMap::new(),
            by_user: HashMap::new(),
        }
    }
}

/// Reference [`EventStore`] backed by per-event locks.
///
/// Cheap to clone conceptually — wrap it in an `Arc` and share the same
/// instance between the admission controller and the scoring engine.
pub struct MemoryStore {
    events: RwLock<HashMap<EventId, Arc<Mutex<EventSlot>>>>,
    /// registration id → owning event, for `release` lookups.
    index: RwLock<HashMap<RegistrationId, EventId>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Adds an event, returning its stored snapshot.
    pub async fn insert(&self, event: Event) -> Event {
        let snapshot = event.clone();
        let mut events = self.events.write().await;
        events.insert(event.id, Arc::new(Mutex::new(EventSlot::new(event))));
        snapshot
    }

    /// Applies a partial update, returning the new snapshot.
    ///
    /// Capacity is not part of [`EventPatch`]; capacity changes go through
    /// [`MemoryStore::set_capacity`] after the admission layer's shrink
    /// guard.
    pub async fn apply_update(&self, event_id: EventId, patch: EventPatch) -> Option<Event> {
        let slot = self.slot(event_id).await?;
        let mut slot = slot.lock().await;
        patch.apply(&mut slot.event);
        Some(slot.event.clone())
    }

    /// Sets a new capacity, returning the new snapshot.
    ///
    /// The store does not re-validate against `reserved_count`; callers
    /// run `AdmissionController::validate_capacity` first.
    pub async fn set_capacity(&self, event_id: EventId, capacity: u32) -> Option<Event> {
        let slot = self.slot(event_id).await?;
        let mut slot = slot.lock().await;
        slot.event.capacity = capacity;
        Some(slot.event.clone())
    }

    /// Moves an event into the terminal `Cancelled` state, returning the
    /// final snapshot. Existing registrations stay on record.
    pub async fn mark_cancelled(&self, event_id: EventId) -> Option<Event> {
        let slot = self.slot(event_id).await?;
        let mut slot = slot.lock().await;
        slot.event.status = EventStatus::Cancelled;
        Some(slot.event.clone())
    }

    async fn slot(&self, event_id: EventId) -> Option<Arc<Mutex<EventSlot>>> {
        self.events.read().await.get(&event_id).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EventStore for MemoryStore {
    async fn try_reserve(
        &self,
        event_id: EventId,
        user: UserIdentity,
    ) -> Result<ReserveOutcome, StoreError> {
        let Some(slot) = self.slot(event_id).await else {
            return Ok(ReserveOutcome::NotFound);
        };

        let (registration, event) = {
            let mut slot = slot.lock().await;
            if slot.event.is_cancelled() {
                return Ok(ReserveOutcome::Cancelled);
            }
            if slot.by_user.contains_key(&user) {
                return Ok(ReserveOutcome::AlreadyRegistered);
            }
            if slot.event.is_full() {
                return Ok(ReserveOutcome::Full {
                    capacity: slot.event.capacity,
                });
            }

            let registration = Registration::confirmed(event_id, user, Utc::now());
            slot.event.reserved_count += 1;
            slot.by_user.insert(user, registration.id);
            slot.registrations
                .insert(registration.id, registration.clone());
            (registration, slot.event.clone())
        };

        // Index write happens outside the slot lock (fixed lock order:
        // slot before index, never both held).
        self.index.write().await.insert(registration.id, event_id);

        Ok(ReserveOutcome::Reserved {
            registration,
            event,
        })
    }

    async fn release(
        &self,
        registration_id: RegistrationId,
    ) -> Result<ReleaseOutcome, StoreError> {
        let event_id = {
            let index = self.index.read().await;
            index.get(&registration_id).copied()
        };
        let Some(event_id) = event_id else {
            return Ok(ReleaseOutcome::NotFound);
        };
        let Some(slot) = self.slot(event_id).await else {
            return Ok(ReleaseOutcome::NotFound);
        };

        let mut slot = slot.lock().await;
        let user = match slot.registrations.get_mut(&registration_id) {
            None => return Ok(ReleaseOutcome::NotFound),
            Some(reg) if !reg.is_confirmed() => return Ok(ReleaseOutcome::AlreadyReleased),
            Some(reg) => {
                reg.status = RegistrationStatus::Cancelled;
                reg.user
            }
        };
        slot.by_user.remove(&user);
        slot.event.reserved_count = slot.event.reserved_count.saturating_sub(1);

        Ok(ReleaseOutcome::Released { event_id })
    }

    async fn get(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        match self.slot(event_id).await {
            Some(slot) => Ok(Some(slot.lock().await.event.clone())),
            None => Ok(None),
        }
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
        let slots: Vec<_> = self.events.read().await.values().cloned().collect();
        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            let slot = slot.lock().await;
            if slot.event.status == EventStatus::Upcoming && slot.event.start_time > now {
                out.push(slot.event.clone());
            }
        }
        out.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(out)
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let slots: Vec<_> = self.events.read().await.values().cloned().collect();
        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            out.push(slot.lock().await.event.clone());
        }
        out.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(out)
    }

    async fn history(&self, user: UserIdentity) -> Result<Vec<Registration>, StoreError> {
        let slots: Vec<_> = self.events.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for slot in slots {
            let slot = slot.lock().await;
            out.extend(
                slot.registrations
                    .values()
                    .filter(|r| r.user == user)
                    .cloned(),
            );
        }
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(out)
    }

    async fn confirmed_count(&self, event_id: EventId) -> Result<u32, StoreError> {
        match self.slot(event_id).await {
            Some(slot) => Ok(slot.lock().await.by_user.len() as u32),
            None => Ok(0),
        }
    }
}
