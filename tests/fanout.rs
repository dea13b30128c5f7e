//! Fan-out delivery: isolation, ordering, and shutdown behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    Category, Config, Event, EventId, FanoutBroadcaster, FanoutError, Notice, Subscribe,
};

use chrono::{Duration as ChronoDuration, Utc};

fn sample_event(title: &str) -> Event {
    let start = Utc::now() + ChronoDuration::days(1);
    Event::new(
        title,
        Category::Social,
        "Quad",
        start,
        start + ChronoDuration::hours(2),
        40,
    )
}

fn small_queue_config(queue: usize) -> Config {
    let mut cfg = Config::default();
    cfg.subscriber_queue = queue;
    cfg.grace = Duration::from_millis(500);
    cfg
}

#[tokio::test]
async fn disconnecting_subscriber_does_not_disturb_the_rest() {
    let broadcaster = FanoutBroadcaster::new(&Config::default());

    let mut alice = broadcaster.subscribe().await.unwrap();
    let mut bob = broadcaster.subscribe().await.unwrap();
    let carol = broadcaster.subscribe().await.unwrap();
    assert_eq!(broadcaster.subscriber_count().await, 3);

    // Carol disconnects mid-flight by dropping her handle.
    drop(carol);

    let event = sample_event("Open Mic");
    broadcaster.publish(Notice::event_created(&event)).await;

    for handle in [&mut alice, &mut bob] {
        let notice = tokio::time::timeout(Duration::from_secs(1), handle.recv())
            .await
            .expect("delivery within a second")
            .expect("still connected");
        assert!(matches!(&*notice, Notice::EventCreated { .. }));
    }

    // Carol's closed queue got her removed; nobody errored.
    assert_eq!(broadcaster.subscriber_count().await, 2);
}

#[tokio::test]
async fn deliveries_preserve_publish_order_per_subscriber() {
    let broadcaster = FanoutBroadcaster::new(&Config::default());
    let mut handle = broadcaster.subscribe().await.unwrap();

    let ids: Vec<EventId> = (0..10).map(|_| EventId::new()).collect();
    for id in &ids {
        broadcaster.publish(Notice::event_deleted(*id)).await;
    }

    for expected in &ids {
        let notice = handle.recv().await.expect("connected");
        match &*notice {
            Notice::EventDeleted { id } => assert_eq!(id, expected),
            other => panic!("unexpected notice: {other:?}"),
        }
    }
}

#[tokio::test]
async fn overflowing_subscriber_is_dropped_not_waited_on() {
    let broadcaster = FanoutBroadcaster::new(&small_queue_config(2));
    let mut slow = broadcaster.subscribe().await.unwrap();
    let mut healthy = broadcaster.subscribe().await.unwrap();

    // Five publishes against a queue of two: the third overflows `slow`.
    for i in 0..5 {
        let event = sample_event(&format!("Night {i}"));
        broadcaster.publish(Notice::event_created(&event)).await;
        // Keep `healthy` draining so only `slow` overflows.
        let notice = healthy.recv().await.expect("healthy stays connected");
        assert!(matches!(&*notice, Notice::EventCreated { .. }));
    }

    assert_eq!(broadcaster.subscriber_count().await, 1);

    // The slow subscriber still drains what was queued before the drop...
    assert!(slow.recv().await.is_some());
    assert!(slow.recv().await.is_some());
    // ...and then observes the disconnect.
    assert!(slow.recv().await.is_none());
}

#[tokio::test]
async fn late_subscriber_sees_nothing_from_the_past() {
    let broadcaster = FanoutBroadcaster::new(&Config::default());

    let event = sample_event("Early Bird");
    broadcaster.publish(Notice::event_created(&event)).await;

    let mut late = broadcaster.subscribe().await.unwrap();
    let silence =
        tokio::time::timeout(Duration::from_millis(200), late.recv()).await;
    assert!(silence.is_err(), "no replay for late subscribers");
}

#[tokio::test]
async fn explicit_unsubscribe_stops_delivery() {
    let broadcaster = FanoutBroadcaster::new(&Config::default());
    let mut handle = broadcaster.subscribe().await.unwrap();

    broadcaster.unsubscribe(handle.id()).await;
    assert_eq!(broadcaster.subscriber_count().await, 0);

    broadcaster
        .publish(Notice::event_deleted(EventId::new()))
        .await;
    // Queue was closed at unsubscribe time; nothing arrives.
    assert!(handle.recv().await.is_none());
}

#[tokio::test]
async fn bus_publishers_reach_subscribers_through_the_bridge() {
    let broadcaster = FanoutBroadcaster::new(&Config::default());
    broadcaster.clone().run();
    let mut handle = broadcaster.subscribe().await.unwrap();

    // Producers only ever see the bus, never the broadcaster.
    let bus = broadcaster.bus();
    bus.publish(Notice::event_deleted(EventId::new()));

    let notice = tokio::time::timeout(Duration::from_secs(1), handle.recv())
        .await
        .expect("bridged within a second")
        .expect("connected");
    assert!(matches!(&*notice, Notice::EventDeleted { .. }));
}

#[tokio::test]
async fn shutdown_disconnects_everyone_and_rejects_newcomers() {
    let broadcaster = FanoutBroadcaster::new(&small_queue_config(8));
    broadcaster.clone().run();
    let mut handle = broadcaster.subscribe().await.unwrap();

    broadcaster.publish(Notice::event_deleted(EventId::new())).await;
    broadcaster.shutdown().await;

    // Already-queued items may drain, but the line ends.
    let mut drained = 0;
    while let Some(_notice) = handle.recv().await {
        drained += 1;
    }
    assert!(drained <= 1);

    assert!(matches!(
        broadcaster.subscribe().await,
        Err(FanoutError::Closed)
    ));

    // Publishing after shutdown is a silent drop, not a panic.
    broadcaster.publish(Notice::event_deleted(EventId::new())).await;
    assert_eq!(broadcaster.subscriber_count().await, 0);
}

struct CountingSubscriber {
    seen: AtomicUsize,
}

#[async_trait::async_trait]
impl Subscribe for CountingSubscriber {
    async fn on_notice(&self, _notice: &Notice) {
        self.seen.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

#[tokio::test]
async fn attached_subscriber_is_driven_by_its_worker() {
    let broadcaster = FanoutBroadcaster::new(&small_queue_config(16));
    let counting = Arc::new(CountingSubscriber {
        seen: AtomicUsize::new(0),
    });
    broadcaster
        .attach(Arc::clone(&counting) as Arc<dyn Subscribe>)
        .await
        .unwrap();

    for _ in 0..4 {
        broadcaster
            .publish(Notice::event_deleted(EventId::new()))
            .await;
    }

    // The worker drains asynchronously; give it a moment.
    tokio::time::timeout(Duration::from_secs(1), async {
        while counting.seen.load(Ordering::SeqCst) < 4 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("worker delivered all four");

    broadcaster.shutdown().await;
    assert_eq!(counting.seen.load(Ordering::SeqCst), 4);
}
