//! Schedule event entity - An entry on the user's local schedule

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::DomainError,
    value_objects::{ScheduleEventId, SubscriptionId},
};

/// Category of a schedule event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Meetings, including everything imported from external feeds
    Meeting,
    /// Focused work block
    Focus,
    /// Personal appointment
    Personal,
    /// Anything else
    Other,
}

impl EventType {
    /// Stable lowercase name used for persistence
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Meeting => "meeting",
            Self::Focus => "focus",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meeting" => Ok(Self::Meeting),
            "focus" => Ok(Self::Focus),
            "personal" => Ok(Self::Personal),
            "other" => Ok(Self::Other),
            other => Err(DomainError::unknown_variant("event type", other)),
        }
    }
}

/// Serde helpers for `HH:MM` wall-clock times
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Format used for stored and serialized times
    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}

/// Payload for creating a schedule event
///
/// Day and times are local wall-clock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScheduleEvent {
    /// Event title
    pub title: String,
    /// Calendar day (local)
    pub date: NaiveDate,
    /// Start time (local, minute precision)
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    /// End time (local, minute precision)
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    /// Event category
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Whether the event was imported from an external feed
    pub is_external: bool,
    /// Subscription that produced this event (lookup key, not ownership)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_calendar_id: Option<SubscriptionId>,
    /// Feed UID, kept for traceability only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_event_id: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl NewScheduleEvent {
    /// Create a meeting imported from the given subscription
    pub fn external(
        subscription_id: SubscriptionId,
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            title: title.into(),
            date,
            start_time,
            end_time,
            event_type: EventType::Meeting,
            is_external: true,
            external_calendar_id: Some(subscription_id),
            external_event_id: None,
            description: None,
            location: None,
        }
    }

    /// Set the feed UID
    #[must_use]
    pub fn with_external_event_id(mut self, uid: impl Into<String>) -> Self {
        self.external_event_id = Some(uid.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A persisted schedule event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    /// Unique identifier
    pub id: ScheduleEventId,
    /// Event content
    #[serde(flatten)]
    pub details: NewScheduleEvent,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEvent {
    /// Stamp a creation payload with identity and metadata
    #[must_use]
    pub fn from_new(id: ScheduleEventId, details: NewScheduleEvent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this event was produced by a sync of `subscription_id`
    #[must_use]
    pub fn is_from_subscription(&self, subscription_id: &SubscriptionId) -> bool {
        self.details.is_external && self.details.external_calendar_id.as_ref() == Some(subscription_id)
    }
}
