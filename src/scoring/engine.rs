//! # ScoringEngine: ranked recommendations and similarity queries.
//!
//! Read-only; runs fully concurrently with admissions and with itself.
//! Result freshness is best-effort relative to concurrent admissions —
//! the ranking reflects a consistent-enough recent state, nothing
//! stronger.
//!
//! ## Ranking rules
//! - `recommend`: score descending, then start time ascending. Users with
//!   no confirmed history get a popularity fallback instead of scores.
//! - `similar_to`: same-category matches rank above title-overlap-only
//!   matches; within a tier, confirmed-registration count descending, then
//!   start time ascending.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Category, Event, EventId, UserIdentity};
use crate::error::ScoringError;
use crate::store::EventStore;

use super::score::{title_tokens, ScoreBreakdown};

/// Stateless ranking over store snapshots.
pub struct ScoringEngine {
    store: Arc<dyn EventStore>,
}

impl ScoringEngine {
    /// Creates an engine reading from `store`.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Ranks upcoming events for `user`, best first, truncated to `limit`.
    ///
    /// Candidates are upcoming events starting after `now` that the user
    /// is not already registered for. Identical snapshots and `now` yield
    /// identical orderings on every call.
    pub async fn recommend(
        &self,
        user: UserIdentity,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, ScoringError> {
        let candidates = self.store.list_upcoming(now).await?;
        let history = self.store.history(user).await?;

        let mut registered: HashSet<EventId> = HashSet::new();
        let mut favorites: HashSet<Category> = HashSet::new();
        for registration in history.iter().filter(|r| r.is_confirmed()) {
            registered.insert(registration.event_id);
            if let Some(event) = self.store.get(registration.event_id).await? {
                favorites.insert(event.category);
            }
        }

        let mut ranked = Vec::with_capacity(candidates.len());
        for event in candidates {
            if registered.contains(&event.id) {
                continue;
            }
            let confirmed = self.store.confirmed_count(event.id).await?;
            ranked.push((event, confirmed));
        }

        if favorites.is_empty() {
            // No history to learn from: most popular first.
            ranked.sort_by(|(a, a_count), (b, b_count)| {
                b_count
                    .cmp(a_count)
                    .then_with(|| a.start_time.cmp(&b.start_time))
            });
            return Ok(ranked
                .into_iter()
                .map(|(event, _)| event)
                .take(limit)
                .collect());
        }

        let mut scored: Vec<(u32, Event)> = ranked
            .into_iter()
            .map(|(event, confirmed)| {
                let score = ScoreBreakdown::compute(&event, confirmed, &favorites, now).total();
                (score, event)
            })
            .collect();
        scored.sort_by(|(a_score, a), (b_score, b)| {
            b_score
                .cmp(a_score)
                .then_with(|| a.start_time.cmp(&b.start_time))
        });

        Ok(scored
            .into_iter()
            .map(|(_, event)| event)
            .take(limit)
            .collect())
    }

    /// Events related to `event_id`, best first, truncated to `limit`.
    ///
    /// Related means same category, or at least one shared title token.
    ///
    /// # Errors
    /// [`ScoringError::EventNotFound`] when the source event is missing.
    pub async fn similar_to(
        &self,
        event_id: EventId,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, ScoringError> {
        let source = self
            .store
            .get(event_id)
            .await?
            .ok_or(ScoringError::EventNotFound { event_id })?;
        let source_tokens = title_tokens(&source.title);

        let mut tiered: Vec<(u8, u32, Event)> = Vec::new();
        for event in self.store.list_upcoming(now).await? {
            if event.id == source.id {
                continue;
            }
            let tier = if event.category == source.category {
                0
            } else if title_tokens(&event.title)
                .intersection(&source_tokens)
                .next()
                .is_some()
            {
                1
            } else {
                continue;
            };
            let confirmed = self.store.confirmed_count(event.id).await?;
            tiered.push((tier, confirmed, event));
        }

        tiered.sort_by(|(a_tier, a_count, a), (b_tier, b_count, b)| {
            a_tier
                .cmp(b_tier)
                .then_with(|| b_count.cmp(a_count))
                .then_with(|| a.start_time.cmp(&b.start_time))
        });

        Ok(tiered
            .into_iter()
            .map(|(_, _, event)| event)
            .take(limit)
            .collect())
    }
}
