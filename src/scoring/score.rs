//! # Recommendation score terms.
//!
//! A candidate's score is the sum of four independent terms, 100 max:
//!
//! | Term       | Max | Rule                                                   |
//! |------------|-----|--------------------------------------------------------|
//! | Category   | 40  | candidate's category is one of the user's favorites    |
//! | Popularity | 30  | 3 points per confirmed registration, capped            |
//! | Recency    | 20  | 20 within 7 days, 15 within 14, 10 within 30, else 5   |
//! | Capacity   | 10  | 10 under 50% occupancy, 7 under 80%, 4 under 95%, else 2 |
//!
//! All terms are integer-valued and derived purely from the snapshot and
//! the explicit `now`, which keeps repeated rankings bit-identical.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{Category, Event};

/// Points awarded when the candidate's category matches a favorite.
const CATEGORY_MATCH: u32 = 40;
/// Points per confirmed registration, and the popularity cap.
const POPULARITY_PER_SEAT: u32 = 3;
const POPULARITY_CAP: u32 = 30;

/// The four independent terms behind one candidate's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    /// 40 on a favorite-category match, else 0.
    pub category: u32,
    /// `min(30, confirmed * 3)`.
    pub popularity: u32,
    /// 20/15/10/5 by start-time horizon.
    pub recency: u32,
    /// 10/7/4/2 by occupancy band.
    pub capacity: u32,
}

impl ScoreBreakdown {
    /// Computes all four terms for `event` against a user's favorite set.
    pub fn compute(
        event: &Event,
        confirmed: u32,
        favorites: &HashSet<Category>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            category: category_term(event.category, favorites),
            popularity: popularity_term(confirmed),
            recency: recency_term(event.start_time, now),
            capacity: capacity_term(event.reserved_count, event.capacity),
        }
    }

    /// Total score in `[0, 100]`.
    pub fn total(&self) -> u32 {
        self.category + self.popularity + self.recency + self.capacity
    }
}

fn category_term(category: Category, favorites: &HashSet<Category>) -> u32 {
    if favorites.contains(&category) {
        CATEGORY_MATCH
    } else {
        0
    }
}

fn popularity_term(confirmed: u32) -> u32 {
    confirmed
        .saturating_mul(POPULARITY_PER_SEAT)
        .min(POPULARITY_CAP)
}

fn recency_term(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let until = start - now;
    if until < Duration::days(7) {
        20
    } else if until < Duration::days(14) {
        15
    } else if until < Duration::days(30) {
        10
    } else {
        5
    }
}

fn capacity_term(reserved: u32, capacity: u32) -> u32 {
    let occupancy = if capacity == 0 {
        1.0
    } else {
        f64::from(reserved) / f64::from(capacity)
    };
    if occupancy < 0.50 {
        10
    } else if occupancy < 0.80 {
        7
    } else if occupancy < 0.95 {
        4
    } else {
        2
    }
}

/// Lowercase alphanumeric tokens of a title.
///
/// Used by the similarity query: two events are title-related when their
/// token sets intersect.
pub(crate) fn title_tokens(title: &str) -> HashSet<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
