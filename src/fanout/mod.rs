//! Live notification fan-out: topics, the internal bus, and the
//! broadcaster that delivers to connected subscribers.
//!
//! ## Contents
//! - [`Notice`], [`Topic`] — the closed set of domain-change notifications
//!   and their payloads
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`; the
//!   fire-and-forget channel the admission layer publishes into
//! - [`FanoutBroadcaster`], [`SubscriberHandle`] — dynamic subscriber set
//!   with bounded per-subscriber queues
//! - [`Subscribe`] — optional trait for in-process consumers driven by a
//!   dedicated worker
//!
//! ## Quick reference
//! - **Publishers**: `AdmissionController` (registration notices), the
//!   surrounding CRUD layer (event lifecycle notices).
//! - **Consumers**: connected clients holding a [`SubscriberHandle`]
//!   (typically drained by a WebSocket session), plus any [`Subscribe`]
//!   implementations attached in-process.
//!
//! Delivery is best-effort and non-persistent: a subscriber that connects
//! after a publish never sees it, and a subscriber that cannot keep up is
//! disconnected rather than allowed to stall anyone else.

mod broadcaster;
mod bus;
#[cfg(feature = "logging")]
mod log;
mod notice;
mod subscriber;

pub use broadcaster::{FanoutBroadcaster, SubscriberHandle, SubscriberId};
pub use bus::Bus;
#[cfg(feature = "logging")]
pub use log::NoticeLogger;
pub use notice::{Notice, Topic};
pub use subscriber::Subscribe;
