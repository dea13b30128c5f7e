//! # Event record and its lifecycle states.
//!
//! An [`Event`] is the unit of scheduling: it has a fixed [`Category`], a
//! time window, a positive capacity, and a `reserved_count` that only the
//! store's atomic reserve/release operations may change.
//!
//! ## Lifecycle
//! ```text
//! Upcoming ──► Ongoing ──► Completed
//!     │
//!     └──────► Cancelled   (terminal: no further reservation changes)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Fixed set of event categories.
///
/// The set is closed: scoring treats categories as exact-match labels, so a
/// free-form string here would silently break the favorite-category term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Workshop,
    Seminar,
    Social,
    Sports,
    Cultural,
    Career,
    Hackathon,
    Conference,
    #[serde(rename = "Club Meeting")]
    ClubMeeting,
    Other,
}

impl Category {
    /// Returns the display label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Workshop => "Workshop",
            Category::Seminar => "Seminar",
            Category::Social => "Social",
            Category::Sports => "Sports",
            Category::Cultural => "Cultural",
            Category::Career => "Career",
            Category::Hackathon => "Hackathon",
            Category::Conference => "Conference",
            Category::ClubMeeting => "Club Meeting",
            Category::Other => "Other",
        }
    }

    /// All categories, in display order.
    pub const ALL: [Category; 10] = [
        Category::Workshop,
        Category::Seminar,
        Category::Social,
        Category::Sports,
        Category::Cultural,
        Category::Career,
        Category::Hackathon,
        Category::Conference,
        Category::ClubMeeting,
        Category::Other,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an event.
///
/// `Cancelled` is terminal: once an event is cancelled, no reservation
/// changes are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

/// A schedulable campus event.
///
/// `reserved_count` is maintained exclusively by the store's atomic
/// reserve/release operations; every other field is mutated through
/// [`EventPatch`] updates by the surrounding CRUD layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Opaque identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Category label (closed set).
    pub category: Category,
    /// Free-form venue description.
    pub location: String,
    /// Scheduled start.
    pub start_time: DateTime<Utc>,
    /// Scheduled end.
    pub end_time: DateTime<Utc>,
    /// Maximum number of confirmed registrations (positive).
    pub capacity: u32,
    /// Number of currently confirmed registrations.
    ///
    /// Invariant: `0 <= reserved_count <= capacity`.
    pub reserved_count: u32,
    /// Lifecycle status.
    pub status: EventStatus,
}

impl Event {
    /// Creates a new `Upcoming` event with no reservations.
    pub fn new(
        title: impl Into<String>,
        category: Category,
        location: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        capacity: u32,
    ) -> Self {
        Self {
            id: EventId::new(),
            title: title.into(),
            category,
            location: location.into(),
            start_time,
            end_time,
            capacity,
            reserved_count: 0,
            status: EventStatus::Upcoming,
        }
    }

    /// Occupancy ratio in `[0.0, 1.0]`.
    ///
    /// A zero capacity (invalid, but representable) reads as fully occupied
    /// rather than dividing by zero.
    pub fn occupancy(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        f64::from(self.reserved_count) / f64::from(self.capacity)
    }

    /// Remaining seats.
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.reserved_count)
    }

    /// True when no further registration can be admitted.
    pub fn is_full(&self) -> bool {
        self.reserved_count >= self.capacity
    }

    /// True for the terminal `Cancelled` state.
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

/// Partial update applied by the surrounding CRUD layer.
///
/// Capacity is deliberately absent: capacity changes must pass the
/// admission layer's shrink guard first and go through
/// [`MemoryStore::set_capacity`](crate::store::MemoryStore::set_capacity).
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub location: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: Option<EventStatus>,
}

impl EventPatch {
    /// Applies the non-empty fields onto `event`.
    pub(crate) fn apply(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Event {
        let start = Utc.with_ymd_and_hms(2025, 10, 1, 18, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 1, 20, 0, 0).unwrap();
        Event::new("Rust Workshop", Category::Workshop, "Lab 2", start, end, 10)
    }

    #[test]
    fn test_occupancy_bounds() {
        let mut ev = sample();
        assert_eq!(ev.occupancy(), 0.0);
        ev.reserved_count = 5;
        assert_eq!(ev.occupancy(), 0.5);
        ev.reserved_count = 10;
        assert_eq!(ev.occupancy(), 1.0);
        assert!(ev.is_full());
    }

    #[test]
    fn test_zero_capacity_reads_full() {
        let mut ev = sample();
        ev.capacity = 0;
        assert_eq!(ev.occupancy(), 1.0);
        assert!(ev.is_full());
        assert_eq!(ev.remaining(), 0);
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut ev = sample();
        let patch = EventPatch {
            title: Some("Advanced Rust Workshop".into()),
            location: Some("Auditorium".into()),
            ..Default::default()
        };
        patch.apply(&mut ev);
        assert_eq!(ev.title, "Advanced Rust Workshop");
        assert_eq!(ev.location, "Auditorium");
        assert_eq!(ev.category, Category::Workshop);
        assert_eq!(ev.capacity, 10);
    }

    #[test]
    fn test_category_serde_labels() {
        let json = serde_json::to_string(&Category::ClubMeeting).unwrap();
        assert_eq!(json, "\"Club Meeting\"");
        let json = serde_json::to_string(&EventStatus::Upcoming).unwrap();
        assert_eq!(json, "\"upcoming\"");
    }
}
