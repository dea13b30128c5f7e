//! # FanoutBroadcaster: non-blocking delivery to live subscribers.
//!
//! Distributes each [`Notice`] to every connected subscriber **without
//! awaiting** any of them.
//!
//! ## What it guarantees
//! - `publish()` returns without waiting for deliveries.
//! - Per-subscriber FIFO (queue order matches publish order).
//! - A subscriber whose queue is full or whose receiving half is gone is
//!   disconnected; nobody else is affected.
//! - After `shutdown()`, no new deliveries occur and `subscribe()` is
//!   rejected.
//!
//! ## What it does **not** guarantee
//! - No ordering across different subscribers.
//! - No replay: connecting after a publish means never seeing it.
//! - No retry: a dropped notice for one subscriber stays dropped.
//!
//! ## Diagram
//! ```text
//! Bus ──► bridge task ──► publish(notice)
//!                             │            (Arc-clone per subscriber)
//!                             ├──► [queue S1] ──► SubscriberHandle::recv()
//!                             ├──► [queue S2] ──► SubscriberHandle::recv()
//!                             └──► [queue SN] ──► worker ──► Subscribe::on_notice()
//!                                  (bounded)       (attached, panic-isolated)
//! ```
//!
//! Subscriber states: connected → (delivering)* → disconnected; once
//! disconnected (explicit unsubscribe, queue overflow, dropped handle, or
//! shutdown) no further delivery is attempted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::FanoutError;

use super::bus::Bus;
use super::notice::Notice;
use super::subscriber::Subscribe;

/// Identifier of a connected subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receiving half of one subscriber's delivery queue.
///
/// Dropping the handle disconnects implicitly: the next delivery attempt
/// observes the closed queue and removes the subscriber.
pub struct SubscriberHandle {
    id: SubscriberId,
    rx: mpsc::Receiver<Arc<Notice>>,
}

impl SubscriberHandle {
    /// This subscriber's identifier.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receives the next notice in publish order.
    ///
    /// Returns `None` once the subscriber is disconnected (unsubscribed,
    /// dropped by overflow, or broadcaster shutdown) and the queue has
    /// drained.
    pub async fn recv(&mut self) -> Option<Arc<Notice>> {
        self.rx.recv().await
    }
}

/// Fan-out coordinator over a dynamic set of subscribers.
///
/// Constructed once at startup, wired to producers through its [`Bus`],
/// and shut down explicitly on termination.
pub struct FanoutBroadcaster {
    bus: Bus,
    queue_capacity: usize,
    grace: std::time::Duration,
    token: CancellationToken,
    next_id: AtomicU64,
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Arc<Notice>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl FanoutBroadcaster {
    /// Creates a broadcaster (call [`run`](Self::run) to start the bridge).
    pub fn new(cfg: &Config) -> Arc<Self> {
        Arc::new(Self {
            bus: Bus::new(cfg.bus_capacity_clamped()),
            queue_capacity: cfg.subscriber_queue_clamped(),
            grace: cfg.grace,
            token: CancellationToken::new(),
            next_id: AtomicU64::new(0),
            subscribers: RwLock::new(HashMap::new()),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Returns a producer handle onto the internal bus.
    ///
    /// Producers publish into the bus and never await delivery; the bridge
    /// task forwards each notice into the per-subscriber queues.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// Starts the bridge task that forwards bus notices to subscribers.
    ///
    /// Takes an `Arc` clone; the caller keeps its own handle:
    /// `broadcaster.clone().run()`.
    pub fn run(self: Arc<Self>) {
        let token = self.token.clone();
        let mut rx = self.bus.subscribe();
        let me = self;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(notice) => me.publish(notice).await,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "fanout bridge lagged behind the bus");
                            continue;
                        }
                    }
                }
            }
        });
    }

    /// Registers a new subscriber with an empty bounded queue.
    ///
    /// Rejected with [`FanoutError::Closed`] after shutdown.
    pub async fn subscribe(&self) -> Result<SubscriberHandle, FanoutError> {
        self.register(self.queue_capacity).await
    }

    async fn register(&self, capacity: usize) -> Result<SubscriberHandle, FanoutError> {
        if self.token.is_cancelled() {
            return Err(FanoutError::Closed);
        }

        let id = SubscriberId(self.next_id.fetch_add(1, AtomicOrdering::Relaxed));
        let (tx, rx) = mpsc::channel::<Arc<Notice>>(capacity.max(1));
        self.subscribers.write().await.insert(id, tx);

        tracing::debug!(subscriber = %id, "subscriber connected");
        Ok(SubscriberHandle { id, rx })
    }

    /// Removes a subscriber; queued deliveries to it are abandoned.
    ///
    /// Unknown ids are ignored (the subscriber may already have been
    /// dropped for overflow).
    pub async fn unsubscribe(&self, id: SubscriberId) {
        if self.subscribers.write().await.remove(&id).is_some() {
            tracing::debug!(subscriber = %id, "subscriber disconnected");
        }
    }

    /// Attaches an in-process [`Subscribe`] implementation.
    ///
    /// Spawns a dedicated worker that drains the subscriber's queue and
    /// calls `on_notice` for each item. Panics inside the implementation
    /// are caught and logged; the worker keeps going. The worker exits when
    /// the subscriber is disconnected (overflow included) or the
    /// broadcaster shuts down.
    pub async fn attach(&self, sub: Arc<dyn Subscribe>) -> Result<SubscriberId, FanoutError> {
        let capacity = match sub.queue_capacity() {
            0 => self.queue_capacity,
            n => n,
        };
        let mut handle = self.register(capacity).await?;

        let name = sub.name();
        let id = handle.id;
        let worker = tokio::spawn(async move {
            while let Some(notice) = handle.recv().await {
                let fut = sub.on_notice(notice.as_ref());
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    tracing::error!(subscriber = name, ?panic_err, "subscriber panicked");
                }
            }
        });
        self.workers.lock().await.push(worker);

        tracing::debug!(subscriber = %id, name, "in-process subscriber attached");
        Ok(id)
    }

    /// Fans one notice out to all connected subscribers.
    ///
    /// Enqueues independently per subscriber via `try_send`; a full or
    /// closed queue disconnects that subscriber and nobody else. Returns
    /// without waiting for any delivery. After shutdown this is a silent
    /// drop.
    pub async fn publish(&self, notice: Notice) {
        if self.token.is_cancelled() {
            tracing::warn!(topic = %notice.topic(), "notice dropped: broadcaster is shut down");
            return;
        }

        let notice = Arc::new(notice);
        let mut dead: Vec<SubscriberId> = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                match tx.try_send(Arc::clone(&notice)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(subscriber = %id, topic = %notice.topic(),
                            "subscriber queue full, disconnecting");
                        dead.push(*id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        tracing::debug!(subscriber = %id, "subscriber gone, removing");
                        dead.push(*id);
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in dead {
                subscribers.remove(&id);
            }
        }
    }

    /// Number of currently connected subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Shuts the broadcaster down.
    ///
    /// 1. Stops the bridge and rejects new subscribers.
    /// 2. Disconnects everyone (queued items may still be drained by
    ///    handles that are already receiving).
    /// 3. Waits up to `grace` for attached workers to finish; stragglers
    ///    are aborted.
    pub async fn shutdown(&self) {
        self.token.cancel();
        self.subscribers.write().await.clear();

        let mut workers: Vec<JoinHandle<()>> = self.workers.lock().await.drain(..).collect();
        let drain = async {
            for worker in workers.iter_mut() {
                let _ = worker.await;
            }
        };
        if tokio::time::timeout(self.grace, drain).await.is_err() {
            tracing::warn!("fanout workers did not drain within grace, aborting");
            for worker in &workers {
                worker.abort();
            }
        }
    }
}
