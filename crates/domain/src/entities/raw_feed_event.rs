//! Raw feed event - A VEVENT as extracted from an ICS feed

use serde::{Deserialize, Serialize};

use crate::value_objects::FeedInstant;

/// An event record produced by the ICS feed parser
///
/// Only built once a VEVENT yielded both a summary and a valid start,
/// so neither can be missing here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFeedEvent {
    /// Sanitized SUMMARY
    pub summary: String,
    /// Parsed DTSTART
    pub start: FeedInstant,
    /// Parsed DTEND, absent when missing or unparsable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<FeedInstant>,
    /// Sanitized DESCRIPTION
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Sanitized LOCATION
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Feed-assigned UID, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl RawFeedEvent {
    /// Create a record with the required fields
    pub fn new(summary: impl Into<String>, start: FeedInstant) -> Self {
        Self {
            summary: summary.into(),
            start,
            end: None,
            description: None,
            location: None,
            uid: None,
        }
    }

    /// Set the end instant
    #[must_use]
    pub const fn with_end(mut self, end: FeedInstant) -> Self {
        self.end = Some(end);
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

    /// Set the UID
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }
}
