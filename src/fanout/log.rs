//! # Simple logging subscriber for debugging and demos.
//!
//! [`NoticeLogger`] records every notice through `tracing` in a compact,
//! human-readable form. Primarily useful for development and examples; for
//! production observability implement a custom
//! [`Subscribe`](crate::fanout::Subscribe).
//!
//! ## Output format
//! ```text
//! registration.created event=7d4f… title="Rust Workshop"
//! capacity.warning event=7d4f… reserved=9 capacity=10
//! registration.cancelled registration=c21a… event=7d4f…
//! ```

use async_trait::async_trait;

use super::notice::Notice;
use super::subscriber::Subscribe;

/// Tracing-backed notice logger.
///
/// Enabled via the `logging` feature.
#[derive(Debug, Default)]
pub struct NoticeLogger;

#[async_trait]
impl Subscribe for NoticeLogger {
    async fn on_notice(&self, notice: &Notice) {
        match notice {
            Notice::EventCreated { event } => {
                tracing::info!(topic = "event.created", event = %event.id, title = %event.title);
            }
            Notice::EventUpdated { event } => {
                tracing::info!(topic = "event.updated", event = %event.id, title = %event.title);
            }
            Notice::EventDeleted { id } => {
                tracing::info!(topic = "event.deleted", event = %id);
            }
            Notice::RegistrationCreated {
                registration,
                event_id,
                event_title,
            } => {
                tracing::info!(
                    topic = "registration.created",
                    registration = %registration.id,
                    event = %event_id,
                    title = %event_title,
                );
            }
            Notice::RegistrationCancelled { id, event_id } => {
                tracing::info!(
                    topic = "registration.cancelled",
                    registration = %id,
                    event = %event_id,
                );
            }
            Notice::CapacityWarning {
                event_id,
                reserved_count,
                capacity,
                ..
            } => {
                tracing::warn!(
                    topic = "capacity.warning",
                    event = %event_id,
                    reserved = reserved_count,
                    capacity = capacity,
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "notice-logger"
    }
}
