//! # Domain-change notices.
//!
//! [`Notice`] is the closed set of notifications the core publishes; each
//! variant carries exactly the payload its consumers are promised, nothing
//! more. [`Topic`] is the wire-level routing label.
//!
//! ## Topics
//! ```text
//! event.created            full event snapshot
//! event.updated            full event snapshot
//! event.deleted            { id }
//! registration.created     { registration, event_id, event_title }
//! registration.cancelled   { id, event_id }
//! capacity.warning         { event_id, event_title, reserved_count, capacity }
//! ```
//!
//! Notices serialize with the topic as a serde tag, so the surrounding
//! transport layer can forward them verbatim.

use serde::Serialize;

use crate::domain::{Event, EventId, Registration, RegistrationId};

/// Routing label for a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    EventCreated,
    EventUpdated,
    EventDeleted,
    RegistrationCreated,
    RegistrationCancelled,
    CapacityWarning,
}

impl Topic {
    /// Returns the dotted wire name of this topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::EventCreated => "event.created",
            Topic::EventUpdated => "event.updated",
            Topic::EventDeleted => "event.deleted",
            Topic::RegistrationCreated => "registration.created",
            Topic::RegistrationCancelled => "registration.cancelled",
            Topic::CapacityWarning => "capacity.warning",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single domain-change notification.
///
/// Cloneable and cheap enough to fan out; the broadcaster wraps each
/// notice in an `Arc` once and shares it across subscriber queues.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "topic", content = "payload")]
pub enum Notice {
    /// A new event exists.
    #[serde(rename = "event.created")]
    EventCreated {
        /// Full snapshot.
        event: Event,
    },

    /// An event's fields changed.
    #[serde(rename = "event.updated")]
    EventUpdated {
        /// Full snapshot after the update.
        event: Event,
    },

    /// An event was removed.
    #[serde(rename = "event.deleted")]
    EventDeleted {
        /// The removed event.
        id: EventId,
    },

    /// A registration was admitted.
    #[serde(rename = "registration.created")]
    RegistrationCreated {
        /// The created registration.
        registration: Registration,
        /// Owning event.
        event_id: EventId,
        /// Owning event's title at admission time.
        event_title: String,
    },

    /// A registration was cancelled.
    #[serde(rename = "registration.cancelled")]
    RegistrationCancelled {
        /// The cancelled registration.
        id: RegistrationId,
        /// Owning event.
        event_id: EventId,
    },

    /// Occupancy crossed the warning threshold upward.
    #[serde(rename = "capacity.warning")]
    CapacityWarning {
        /// The nearly-full event.
        event_id: EventId,
        /// Its title at crossing time.
        event_title: String,
        /// Confirmed registrations after the crossing admission.
        reserved_count: u32,
        /// Configured capacity.
        capacity: u32,
    },
}

impl Notice {
    /// Returns this notice's routing topic.
    pub fn topic(&self) -> Topic {
        match self {
            Notice::EventCreated { .. } => Topic::EventCreated,
            Notice::EventUpdated { .. } => Topic::EventUpdated,
            Notice::EventDeleted { .. } => Topic::EventDeleted,
            Notice::RegistrationCreated { .. } => Topic::RegistrationCreated,
            Notice::RegistrationCancelled { .. } => Topic::RegistrationCancelled,
            Notice::CapacityWarning { .. } => Topic::CapacityWarning,
        }
    }

    /// Builds a `registration.created` notice from the admission result.
    pub fn registration_created(registration: &Registration, event: &Event) -> Self {
        Notice::RegistrationCreated {
            registration: registration.clone(),
            event_id: event.id,
            event_title: event.title.clone(),
        }
    }

    /// Builds a `registration.cancelled` notice.
    pub fn registration_cancelled(id: RegistrationId, event_id: EventId) -> Self {
        Notice::RegistrationCancelled { id, event_id }
    }

    /// Builds a `capacity.warning` notice from a post-admission snapshot.
    pub fn capacity_warning(event: &Event) -> Self {
        Notice::CapacityWarning {
            event_id: event.id,
            event_title: event.title.clone(),
            reserved_count: event.reserved_count,
            capacity: event.capacity,
        }
    }

    /// Builds an `event.created` notice.
    pub fn event_created(event: &Event) -> Self {
        Notice::EventCreated {
            event: event.clone(),
        }
    }

    /// Builds an `event.updated` notice.
    pub fn event_updated(event: &Event) -> Self {
        Notice::EventUpdated {
            event: event.clone(),
        }
    }

    /// Builds an `event.deleted` notice.
    pub fn event_deleted(id: EventId) -> Self {
        Notice::EventDeleted { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use chrono::{Duration, Utc};

    #[test]
    fn test_topic_wire_names() {
        assert_eq!(Topic::RegistrationCreated.as_str(), "registration.created");
        assert_eq!(Topic::CapacityWarning.as_str(), "capacity.warning");
    }

    #[test]
    fn test_serialized_shape_carries_topic_tag() {
        let start = Utc::now() + Duration::days(1);
        let mut event = Event::new("Career Fair", Category::Career, "Hall A", start, start, 100);
        event.reserved_count = 90;

        let json = serde_json::to_value(Notice::capacity_warning(&event)).unwrap();
        assert_eq!(json["topic"], "capacity.warning");
        assert_eq!(json["payload"]["reserved_count"], 90);
        assert_eq!(json["payload"]["capacity"], 100);
        assert_eq!(json["payload"]["event_title"], "Career Fair");

        let json = serde_json::to_value(Notice::event_deleted(event.id)).unwrap();
        assert_eq!(json["topic"], "event.deleted");
        assert_eq!(json["payload"]["id"], serde_json::to_value(event.id).unwrap());
    }
}
