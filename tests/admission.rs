//! Admission invariants under real concurrency.
//!
//! These tests exercise the public wiring end to end: store, controller,
//! bus, and broadcaster, with registrations raced on a multi-threaded
//! runtime.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::Barrier;

use eventvisor::{
    AdmissionController, AdmissionError, Category, Config, Event, EventStore, FanoutBroadcaster,
    MemoryStore, Notice, RegistrationId, ReleaseOutcome, ReserveOutcome, StoreError,
    SubscriberHandle, UserIdentity,
};

fn upcoming(capacity: u32) -> Event {
    let start = Utc::now() + ChronoDuration::days(3);
    Event::new(
        "Intro to Databases",
        Category::Seminar,
        "Hall B",
        start,
        start + ChronoDuration::hours(2),
        capacity,
    )
}

struct Harness {
    store: Arc<MemoryStore>,
    admission: Arc<AdmissionController>,
    broadcaster: Arc<FanoutBroadcaster>,
}

fn harness() -> Harness {
    let cfg = Config::default();
    let store = Arc::new(MemoryStore::new());
    let broadcaster = FanoutBroadcaster::new(&cfg);
    broadcaster.clone().run();
    let admission = Arc::new(AdmissionController::new(
        Arc::clone(&store) as Arc<dyn EventStore>,
        broadcaster.bus(),
        &cfg,
    ));
    Harness {
        store,
        admission,
        broadcaster,
    }
}

/// Drains every notice that arrives until the line goes quiet.
async fn drain(handle: &mut SubscriberHandle) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(Some(notice)) = tokio::time::timeout(Duration::from_millis(200), handle.recv()).await
    {
        out.push((*notice).clone());
    }
    out
}

fn warning_count(notices: &[Notice]) -> usize {
    notices
        .iter()
        .filter(|n| matches!(n, Notice::CapacityWarning { .. }))
        .count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_registrations_never_overbook() {
    let h = harness();
    let event = h.store.insert(upcoming(5)).await;

    let barrier = Arc::new(Barrier::new(20));
    let mut tasks = Vec::new();
    for _ in 0..20 {
        let admission = Arc::clone(&h.admission);
        let barrier = Arc::clone(&barrier);
        let event_id = event.id;
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            admission.register(event_id, UserIdentity::new()).await
        }));
    }

    let mut successes = 0;
    let mut capacity_denials = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AdmissionError::CapacityExceeded { .. }) => capacity_denials += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(capacity_denials, 15);
    let stored = h.store.get(event.id).await.unwrap().unwrap();
    assert_eq!(stored.reserved_count, 5);
    assert_eq!(h.store.confirmed_count(event.id).await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_user_race_admits_once() {
    let h = harness();
    let event = h.store.insert(upcoming(10)).await;
    let user = UserIdentity::new();

    let barrier = Arc::new(Barrier::new(2));
    let mut tasks = Vec::new();
    for _ in 0..2 {
        let admission = Arc::clone(&h.admission);
        let barrier = Arc::clone(&barrier);
        let event_id = event.id;
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            admission.register(event_id, user).await
        }));
    }

    let mut successes = 0;
    let mut duplicates = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AdmissionError::DuplicateRegistration { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(duplicates, 1);
    assert_eq!(h.store.confirmed_count(event.id).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn capacity_two_admits_exactly_two_of_three() {
    let h = harness();
    let event = h.store.insert(upcoming(2)).await;

    let barrier = Arc::new(Barrier::new(3));
    let mut tasks = Vec::new();
    for _ in 0..3 {
        let admission = Arc::clone(&h.admission);
        let barrier = Arc::clone(&barrier);
        let event_id = event.id;
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            admission.register(event_id, UserIdentity::new()).await
        }));
    }

    let results: Vec<_> = {
        let mut out = Vec::new();
        for task in tasks {
            out.push(task.await.unwrap());
        }
        out
    };

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AdmissionError::CapacityExceeded { .. })))
            .count(),
        1
    );
    let stored = h.store.get(event.id).await.unwrap().unwrap();
    assert_eq!(stored.reserved_count, 2);
}

#[tokio::test]
async fn cancel_frees_a_seat_for_the_next_user() {
    let h = harness();
    let event = h.store.insert(upcoming(1)).await;

    let first = h
        .admission
        .register(event.id, UserIdentity::new())
        .await
        .unwrap();

    let blocked = h.admission.register(event.id, UserIdentity::new()).await;
    assert!(matches!(
        blocked,
        Err(AdmissionError::CapacityExceeded { .. })
    ));

    h.admission.cancel(first.id).await.unwrap();
    assert_eq!(h.store.get(event.id).await.unwrap().unwrap().reserved_count, 0);

    h.admission
        .register(event.id, UserIdentity::new())
        .await
        .expect("seat freed by cancellation");
}

#[tokio::test]
async fn double_cancel_is_reported() {
    let h = harness();
    let event = h.store.insert(upcoming(3)).await;
    let registration = h
        .admission
        .register(event.id, UserIdentity::new())
        .await
        .unwrap();

    h.admission.cancel(registration.id).await.unwrap();
    let second = h.admission.cancel(registration.id).await;
    assert!(matches!(
        second,
        Err(AdmissionError::AlreadyCancelled { .. })
    ));

    let missing = h.admission.cancel(RegistrationId::new()).await;
    assert!(matches!(
        missing,
        Err(AdmissionError::RegistrationNotFound { .. })
    ));
}

#[tokio::test]
async fn cancelled_event_rejects_registration() {
    let h = harness();
    let event = h.store.insert(upcoming(3)).await;
    h.store.mark_cancelled(event.id).await;

    let denied = h.admission.register(event.id, UserIdentity::new()).await;
    assert!(matches!(denied, Err(AdmissionError::EventCancelled { .. })));
}

#[tokio::test]
async fn capacity_warning_fires_once_per_crossing() {
    let h = harness();
    let event = h.store.insert(upcoming(10)).await;
    let mut live = h.broadcaster.subscribe().await.unwrap();

    // 0 → 8: below the threshold, no warning expected.
    let mut seats = Vec::new();
    for _ in 0..8 {
        seats.push(
            h.admission
                .register(event.id, UserIdentity::new())
                .await
                .unwrap(),
        );
    }
    assert_eq!(warning_count(&drain(&mut live).await), 0);

    // 8 → 9 crosses 90%: exactly one warning.
    seats.push(
        h.admission
            .register(event.id, UserIdentity::new())
            .await
            .unwrap(),
    );
    let notices = drain(&mut live).await;
    assert_eq!(warning_count(&notices), 1);
    assert!(notices.iter().any(|n| matches!(
        n,
        Notice::CapacityWarning { reserved_count: 9, capacity: 10, .. }
    )));

    // 9 → 10 stays above: silent.
    seats.push(
        h.admission
            .register(event.id, UserIdentity::new())
            .await
            .unwrap(),
    );
    assert_eq!(warning_count(&drain(&mut live).await), 0);

    // Drop to 8, then cross again: the warning re-arms.
    h.admission.cancel(seats.pop().unwrap().id).await.unwrap();
    h.admission.cancel(seats.pop().unwrap().id).await.unwrap();
    assert_eq!(warning_count(&drain(&mut live).await), 0);

    h.admission
        .register(event.id, UserIdentity::new())
        .await
        .unwrap();
    assert_eq!(warning_count(&drain(&mut live).await), 1);
}

#[tokio::test]
async fn shrinking_capacity_below_reserved_is_rejected() {
    let h = harness();
    let event = h.store.insert(upcoming(5)).await;
    for _ in 0..3 {
        h.admission
            .register(event.id, UserIdentity::new())
            .await
            .unwrap();
    }

    let denied = h.admission.validate_capacity(event.id, 2).await;
    assert!(matches!(
        denied,
        Err(AdmissionError::InvalidCapacity {
            requested: 2,
            reserved: 3
        })
    ));
    assert!(matches!(
        h.admission.validate_capacity(event.id, 0).await,
        Err(AdmissionError::InvalidCapacity { .. })
    ));

    h.admission.validate_capacity(event.id, 3).await.unwrap();
    h.admission.validate_capacity(event.id, 50).await.unwrap();
    h.store.set_capacity(event.id, 50).await.unwrap();
    assert_eq!(h.store.get(event.id).await.unwrap().unwrap().capacity, 50);
}

/// Store stub whose atomic operations hang, for timeout coverage.
struct StalledStore;

#[async_trait::async_trait]
impl EventStore for StalledStore {
    async fn try_reserve(
        &self,
        _event_id: eventvisor::EventId,
        _user: UserIdentity,
    ) -> Result<ReserveOutcome, StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(ReserveOutcome::NotFound)
    }

    async fn release(
        &self,
        _registration_id: RegistrationId,
    ) -> Result<ReleaseOutcome, StoreError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(ReleaseOutcome::NotFound)
    }

    async fn get(
        &self,
        _event_id: eventvisor::EventId,
    ) -> Result<Option<Event>, StoreError> {
        Ok(None)
    }

    async fn list_upcoming(
        &self,
        _now: chrono::DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        Ok(Vec::new())
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(Vec::new())
    }

    async fn history(
        &self,
        _user: UserIdentity,
    ) -> Result<Vec<eventvisor::Registration>, StoreError> {
        Ok(Vec::new())
    }

    async fn confirmed_count(&self, _event_id: eventvisor::EventId) -> Result<u32, StoreError> {
        Ok(0)
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_storage_surfaces_as_unavailable() {
    let mut cfg = Config::default();
    cfg.storage_timeout = Duration::from_millis(100);

    let broadcaster = FanoutBroadcaster::new(&cfg);
    let admission =
        AdmissionController::new(Arc::new(StalledStore), broadcaster.bus(), &cfg);

    let denied = admission
        .register(eventvisor::EventId::new(), UserIdentity::new())
        .await;
    match denied {
        Err(err @ AdmissionError::StorageUnavailable { .. }) => {
            assert!(err.is_retryable());
        }
        other => panic!("expected StorageUnavailable, got {other:?}"),
    }

    let denied = admission.cancel(RegistrationId::new()).await;
    assert!(matches!(
        denied,
        Err(AdmissionError::StorageUnavailable { .. })
    ));
}
