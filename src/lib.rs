//! # eventvisor
//!
//! **Eventvisor** is the core of a campus event system: capacity-safe
//! registration admission, deterministic recommendation scoring, and live
//! fan-out of domain changes to connected clients.
//!
//! It is a library, not a server: HTTP routing, schema validation,
//! authentication, and rendering live in the surrounding layers. What
//! lives here is the part that has to be *right* under concurrency —
//! nobody gets overbooked, rankings are reproducible, and one slow client
//! never stalls the rest.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   register / cancel                    recommend / similar_to
//!          │                                      │
//!          ▼                                      ▼
//! ┌──────────────────────┐             ┌──────────────────────┐
//! │ AdmissionController  │             │    ScoringEngine     │
//! │ - maps outcomes to   │             │ - pure over snapshot │
//! │   typed errors       │             │   + explicit `now`   │
//! │ - bounded storage    │             └──────────┬───────────┘
//! │   timeout            │                        │ reads
//! └──────┬───────┬───────┘                        ▼
//!        │       │ one atomic call   ┌─────────────────────────┐
//!        │       └──────────────────►│ EventStore (trait)      │
//!        │                           │ - try_reserve / release │
//!        │ publish(Notice)           │   serialized per event  │
//!        ▼                           │ - MemoryStore: one lock │
//! ┌──────────────┐                   │   per event             │
//! │     Bus      │                   └─────────────────────────┘
//! │ (broadcast)  │
//! └──────┬───────┘
//!        ▼
//! ┌──────────────────────┐    try_send   ┌─────────────────┐
//! │  FanoutBroadcaster   │ ─────────────►│ [queue] sub 1   │
//! │  - bridge task       │ ─────────────►│ [queue] sub 2   │
//! │  - dynamic member-   │ ─────────────►│ [queue] sub N   │
//! │    ship, bounded     │   (bounded;   └─────────────────┘
//! │    queues            │    overflow = disconnect)
//! └──────────────────────┘
//! ```
//!
//! ### Delivery rules
//! - `publish` never waits for a subscriber; a full or vanished queue
//!   disconnects that subscriber only.
//! - Per-subscriber FIFO; no ordering across subscribers; no replay.
//! - Admission never fails because notification delivery failed.
//!
//! ## Features
//! | Area           | Description                                            | Key types                                      |
//! |----------------|--------------------------------------------------------|------------------------------------------------|
//! | **Admission**  | Capacity/duplicate invariants under concurrency.       | [`AdmissionController`], [`AdmissionError`]    |
//! | **Storage**    | Atomic reservation contract + in-memory reference.     | [`EventStore`], [`MemoryStore`]                |
//! | **Scoring**    | Deterministic rankings with explainable terms.         | [`ScoringEngine`], [`ScoreBreakdown`]          |
//! | **Fan-out**    | Bounded, isolated delivery to live subscribers.        | [`FanoutBroadcaster`], [`SubscriberHandle`]    |
//! | **Notices**    | Closed set of domain-change payloads.                  | [`Notice`], [`Topic`]                          |
//! | **Analytics**  | Read-only dashboard aggregates.                        | [`statistics`], [`Statistics`]                 |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`NoticeLogger`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use chrono::{Duration, Utc};
//! use eventvisor::{
//!     AdmissionController, Category, Config, Event, EventStore, FanoutBroadcaster,
//!     MemoryStore, ScoringEngine, UserIdentity,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let broadcaster = FanoutBroadcaster::new(&cfg);
//!     broadcaster.clone().run();
//!
//!     let admission = AdmissionController::new(
//!         Arc::clone(&store) as Arc<dyn EventStore>,
//!         broadcaster.bus(),
//!         &cfg,
//!     );
//!     let scoring = ScoringEngine::new(Arc::clone(&store) as Arc<dyn EventStore>);
//!
//!     // Seed one event and register a user.
//!     let start = Utc::now() + Duration::days(2);
//!     let event = store
//!         .insert(Event::new(
//!             "Rust Workshop",
//!             Category::Workshop,
//!             "Lab 2",
//!             start,
//!             start + Duration::hours(2),
//!             30,
//!         ))
//!         .await;
//!
//!     let mut live = broadcaster.subscribe().await?;
//!     let user = UserIdentity::new();
//!     let registration = admission.register(event.id, user).await?;
//!     assert_eq!(registration.event_id, event.id);
//!
//!     // The subscriber sees the admission as a notice.
//!     let notice = live.recv().await.expect("delivery");
//!     assert_eq!(notice.topic().as_str(), "registration.created");
//!
//!     // Read path runs independently.
//!     let picks = scoring.recommend(UserIdentity::new(), 5, Utc::now()).await?;
//!     assert_eq!(picks.len(), 1);
//!
//!     broadcaster.shutdown().await;
//!     Ok(())
//! }
//! ```

mod admission;
mod analytics;
mod config;
mod domain;
mod error;
mod fanout;
mod scoring;
mod store;

pub use admission::AdmissionController;
pub use analytics::{statistics, CategoryCount, Statistics};
pub use config::{Config, DEFAULT_WARN_THRESHOLD};
pub use domain::{
    Category, Event, EventId, EventPatch, EventStatus, Registration, RegistrationId,
    RegistrationStatus, UserIdentity,
};
pub use error::{AdmissionError, FanoutError, ScoringError};
pub use fanout::{Bus, FanoutBroadcaster, Notice, Subscribe, SubscriberHandle, SubscriberId, Topic};
pub use scoring::{ScoreBreakdown, ScoringEngine};
pub use store::{EventStore, MemoryStore, ReleaseOutcome, ReserveOutcome, StoreError};

#[cfg(feature = "logging")]
pub use fanout::NoticeLogger;
