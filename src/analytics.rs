//! # Read-only statistics over the event store.
//!
//! Aggregates for dashboards: totals, status breakdown, occupancy, and
//! per-category distribution. Pure reads — never touches the admission
//! path's locks beyond individual snapshot reads, and carries the same
//! best-effort freshness as the scoring path.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Category, EventStatus};
use crate::store::{EventStore, StoreError};

/// Count of events in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The category label.
    pub category: Category,
    /// Events carrying it.
    pub count: u32,
}

/// Aggregate statistics snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    /// Every event on record.
    pub total_events: u32,
    /// Events with a future start and `Upcoming` status.
    pub upcoming_events: u32,
    /// Events currently in their scheduled window.
    pub ongoing_events: u32,
    /// Events in the terminal cancelled state.
    pub cancelled_events: u32,
    /// Confirmed registrations across all events.
    pub total_confirmed: u32,
    /// Mean occupancy ratio over events with positive capacity.
    pub average_occupancy: f64,
    /// Events at or above `warn_threshold` occupancy.
    pub near_capacity_events: u32,
    /// Per-category event counts, descending.
    pub categories: Vec<CategoryCount>,
}

/// Computes a statistics snapshot as of `now`.
///
/// `warn_threshold` is the same occupancy ratio the admission layer warns
/// at; pass `Config::warn_threshold_clamped()` to keep the two views
/// consistent.
pub async fn statistics(
    store: &dyn EventStore,
    now: DateTime<Utc>,
    warn_threshold: f64,
) -> Result<Statistics, StoreError> {
    let events = store.list_all().await?;

    let mut upcoming = 0u32;
    let mut ongoing = 0u32;
    let mut cancelled = 0u32;
    let mut confirmed = 0u32;
    let mut occupancy_sum = 0.0f64;
    let mut sized_events = 0u32;
    let mut near_capacity = 0u32;
    let mut per_category = Category::ALL.map(|category| CategoryCount { category, count: 0 });

    for event in &events {
        match event.status {
            EventStatus::Upcoming if event.start_time > now => upcoming += 1,
            EventStatus::Cancelled => cancelled += 1,
            _ if event.start_time <= now && event.end_time >= now => ongoing += 1,
            _ => {}
        }
        confirmed += event.reserved_count;
        if event.capacity > 0 {
            occupancy_sum += event.occupancy();
            sized_events += 1;
            if event.occupancy() >= warn_threshold {
                near_capacity += 1;
            }
        }
        if let Some(entry) = per_category
            .iter_mut()
            .find(|c| c.category == event.category)
        {
            entry.count += 1;
        }
    }

    let mut categories: Vec<CategoryCount> =
        per_category.into_iter().filter(|c| c.count > 0).collect();
    categories.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(Statistics {
        total_events: events.len() as u32,
        upcoming_events: upcoming,
        ongoing_events: ongoing,
        cancelled_events: cancelled,
        total_confirmed: confirmed,
        average_occupancy: if sized_events == 0 {
            0.0
        } else {
            occupancy_sum / f64::from(sized_events)
        },
        near_capacity_events: near_capacity,
        categories,
    })
}
