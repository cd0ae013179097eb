//! Calendar subscription entity - A user-configured external ICS feed

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{errors::DomainError, value_objects::SubscriptionId};

/// Fallback message used when a sync fails without a usable description
const UNKNOWN_SYNC_ERROR: &str = "Unknown sync error";

/// Default display color for new subscriptions
pub const DEFAULT_SUBSCRIPTION_COLOR: &str = "#4285F4";

/// Sync state of a subscription
///
/// `Pending -> Syncing -> {Success | Error}`; both terminal states move back
/// to `Syncing` on the next sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Registered but never synced
    #[default]
    Pending,
    /// A sync is in progress
    Syncing,
    /// The last sync completed
    Success,
    /// The last sync failed, see `last_sync_error`
    Error,
}

impl SyncStatus {
    /// Stable lowercase name used for persistence
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "syncing" => Ok(Self::Syncing),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(DomainError::unknown_variant("sync status", other)),
        }
    }
}

/// An external calendar feed the user subscribed to
///
/// Status fields are only mutated through [`mark_syncing`](Self::mark_syncing),
/// [`mark_success`](Self::mark_success) and [`mark_error`](Self::mark_error),
/// which keep the status and its companion fields consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CalendarSubscription {
    /// Unique identifier
    pub id: SubscriptionId,
    /// Display name
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Feed URL (http or https)
    #[validate(url)]
    pub url: String,
    /// Display color as `#RRGGBB`
    #[validate(custom(function = "validate_color"))]
    pub color: String,
    /// Whether the subscription takes part in syncs
    pub enabled: bool,
    /// When the last successful sync finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Current sync state
    pub sync_status: SyncStatus,
    /// Message of the last failed sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_error: Option<String>,
    /// When the subscription was registered
    pub created_at: DateTime<Utc>,
    /// When the subscription was last modified
    pub updated_at: DateTime<Utc>,
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = color.strip_prefix('#').unwrap_or_default();
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("color").with_message("expected #RRGGBB".into()))
    }
}

impl CalendarSubscription {
    /// Register a new, enabled subscription in `Pending` state
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty or too long, the URL
    /// does not parse, or the color is not `#RRGGBB`.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();
        let subscription = Self {
            id: SubscriptionId::new(),
            name: name.into().trim().to_string(),
            url: url.into().trim().to_string(),
            color: color.into(),
            enabled: true,
            last_synced_at: None,
            sync_status: SyncStatus::Pending,
            last_sync_error: None,
            created_at: now,
            updated_at: now,
        };

        subscription
            .validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        Ok(subscription)
    }

    /// Enable or disable syncing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.touch();
    }

    /// Enter the `Syncing` state
    ///
    /// A previous error message is kept until the sync succeeds.
    pub fn mark_syncing(&mut self) {
        self.sync_status = SyncStatus::Syncing;
        self.touch();
    }

    /// Record a completed sync
    pub fn mark_success(&mut self, synced_at: DateTime<Utc>) {
        self.sync_status = SyncStatus::Success;
        self.last_synced_at = Some(synced_at);
        self.last_sync_error = None;
        self.touch();
    }

    /// Record a failed sync
    ///
    /// The stored message is never empty.
    pub fn mark_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_SYNC_ERROR.to_string()
        } else {
            message
        };

        self.sync_status = SyncStatus::Error;
        self.last_sync_error = Some(message);
        self.touch();
    }

    /// Check whether a sync is currently running
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.sync_status == SyncStatus::Syncing
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
