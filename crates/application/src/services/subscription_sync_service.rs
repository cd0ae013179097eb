//! Subscription sync service
//!
//! Owns the lifecycle of calendar subscriptions and reconciles each
//! subscription's feed into the local schedule.
//!
//! A sync replaces every event previously imported from the subscription:
//! existing events are deleted, then the freshly parsed feed is inserted.
//! Deletion and insertion are separate storage operations, so a crash in
//! between leaves the subscription with a partial event set until the next
//! sync. Syncs of the same subscription are serialized; syncs of different
//! subscriptions run independently.

use std::{collections::HashMap, fmt, sync::Arc};

use chrono::Utc;
use domain::{
    CalendarSubscription, DEFAULT_SUBSCRIPTION_COLOR, ScheduleEvent, SubscriptionId,
};
use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::ApplicationError,
    feed_parser::parse_feed,
    ports::{
        EventCreationPort, FeedFetcherPort, ScheduleEventStore, SubscriptionStore, TextSanitizer,
    },
    services::{EventConverter, UrlSafetyValidator},
};

/// What a single sync call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No subscription with that id exists
    NotFound,
    /// The subscription is disabled and was left untouched
    Disabled,
    /// The feed was fetched and the local events replaced
    Synced(SyncStats),
}

/// Counters for a completed sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Events the parser extracted from the feed
    pub parsed: usize,
    /// Events written to the schedule
    pub created: usize,
    /// Parsed events the converter rejected
    pub skipped: usize,
    /// Previously imported events that were deleted
    pub removed: u64,
}

/// A subscription whose sync failed during a bulk run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// Subscription ID
    pub subscription_id: SubscriptionId,
    /// Subscription display name
    pub name: String,
    /// Error message, as recorded in `last_sync_error`
    pub message: String,
}

/// Result of [`SubscriptionSyncService::sync_all_calendars`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSyncReport {
    /// Subscriptions that synced successfully
    pub succeeded: Vec<SubscriptionId>,
    /// Subscriptions whose sync failed
    pub failed: Vec<SyncFailure>,
}

impl BulkSyncReport {
    /// Number of subscriptions attempted
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Whether every attempted sync succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Service for managing and syncing calendar subscriptions
pub struct SubscriptionSyncService {
    subscriptions: Arc<dyn SubscriptionStore>,
    events: Arc<dyn ScheduleEventStore>,
    event_creator: Arc<dyn EventCreationPort>,
    fetcher: Arc<dyn FeedFetcherPort>,
    sanitizer: Arc<dyn TextSanitizer>,
    /// One lock per subscription, held for the whole sync
    sync_locks: Mutex<HashMap<SubscriptionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl fmt::Debug for SubscriptionSyncService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionSyncService")
            .field("active_locks", &self.sync_locks.lock().len())
            .finish_non_exhaustive()
    }
}

impl SubscriptionSyncService {
    /// Create a new sync service
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        events: Arc<dyn ScheduleEventStore>,
        event_creator: Arc<dyn EventCreationPort>,
        fetcher: Arc<dyn FeedFetcherPort>,
        sanitizer: Arc<dyn TextSanitizer>,
    ) -> Self {
        Self {
            subscriptions,
            events,
            event_creator,
            fetcher,
            sanitizer,
            sync_locks: Mutex::new(HashMap::new()),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Register a new subscription
    ///
    /// The subscription starts enabled and `Pending`. URL safety is checked
    /// at sync time, not here.
    #[instrument(skip(self))]
    pub async fn add_subscription(
        &self,
        name: &str,
        url: &str,
        color: Option<&str>,
    ) -> Result<CalendarSubscription, ApplicationError> {
        let subscription =
            CalendarSubscription::new(name, url, color.unwrap_or(DEFAULT_SUBSCRIPTION_COLOR))?;
        self.subscriptions.save(&subscription).await?;

        info!(subscription_id = %subscription.id, name = %subscription.name, "Added subscription");
        Ok(subscription)
    }

    /// List all subscriptions
    #[instrument(skip(self))]
    pub async fn list_subscriptions(&self) -> Result<Vec<CalendarSubscription>, ApplicationError> {
        self.subscriptions.list().await
    }

    /// Get a subscription by ID
    #[instrument(skip(self))]
    pub async fn get_subscription(
        &self,
        id: &SubscriptionId,
    ) -> Result<CalendarSubscription, ApplicationError> {
        self.subscriptions
            .get(id)
            .await?
            .ok_or_else(|| subscription_not_found(id))
    }

    /// Enable or disable a subscription
    #[instrument(skip(self))]
    pub async fn set_enabled(
        &self,
        id: &SubscriptionId,
        enabled: bool,
    ) -> Result<CalendarSubscription, ApplicationError> {
        let lock = self.sync_lock(id);
        let guard = lock.lock().await;

        let Some(mut subscription) = self.subscriptions.get(id).await? else {
            drop(guard);
            self.release_lock(id, &lock);
            return Err(subscription_not_found(id));
        };
        subscription.set_enabled(enabled);
        self.subscriptions.save(&subscription).await?;

        info!(subscription_id = %id, enabled, "Updated subscription");
        Ok(subscription)
    }

    /// Delete a subscription and every event it produced
    ///
    /// # Returns
    /// Number of deleted events
    #[instrument(skip(self))]
    pub async fn remove_subscription(&self, id: &SubscriptionId) -> Result<u64, ApplicationError> {
        let lock = self.sync_lock(id);
        let removed = {
            let guard = lock.lock().await;

            if self.subscriptions.get(id).await?.is_none() {
                drop(guard);
                self.release_lock(id, &lock);
                return Err(subscription_not_found(id));
            }
            let removed = self.events.delete_by_external_calendar(id).await?;
            self.subscriptions.delete(id).await?;
            removed
        };
        self.sync_locks.lock().remove(id);

        info!(subscription_id = %id, removed, "Removed subscription");
        Ok(removed)
    }

    /// List the events imported from a subscription
    #[instrument(skip(self))]
    pub async fn events_for_subscription(
        &self,
        id: &SubscriptionId,
    ) -> Result<Vec<ScheduleEvent>, ApplicationError> {
        self.events.list_for_subscription(id).await
    }

    // ------------------------------------------------------------------
    // Sync
    // ------------------------------------------------------------------

    /// Sync one subscription
    ///
    /// Missing and disabled subscriptions are skipped without a status
    /// change. Any failure is recorded on the subscription as `Error` with
    /// the error's message and then returned.
    #[instrument(skip(self))]
    pub async fn sync_calendar(&self, id: &SubscriptionId) -> Result<SyncOutcome, ApplicationError> {
        let lock = self.sync_lock(id);
        let guard = lock.lock().await;

        let Some(mut subscription) = self.subscriptions.get(id).await? else {
            debug!(subscription_id = %id, "Subscription not found, nothing to sync");
            drop(guard);
            self.release_lock(id, &lock);
            return Ok(SyncOutcome::NotFound);
        };
        if !subscription.enabled {
            debug!(subscription_id = %id, "Subscription disabled, skipping sync");
            return Ok(SyncOutcome::Disabled);
        }

        if !UrlSafetyValidator::is_safe(&subscription.url) {
            warn!(subscription_id = %id, url = %subscription.url, "Refusing to fetch unsafe feed URL");
            let error = ApplicationError::UnsafeFeedUrl;
            subscription.mark_error(error.to_string());
            self.subscriptions.save(&subscription).await?;
            return Err(error);
        }

        subscription.mark_syncing();
        self.subscriptions.save(&subscription).await?;

        match self.replace_events(&subscription).await {
            Ok(stats) => {
                subscription.mark_success(Utc::now());
                self.subscriptions.save(&subscription).await?;
                info!(
                    subscription_id = %id,
                    parsed = stats.parsed,
                    created = stats.created,
                    skipped = stats.skipped,
                    removed = stats.removed,
                    "Subscription synced"
                );
                Ok(SyncOutcome::Synced(stats))
            },
            Err(error) => {
                warn!(subscription_id = %id, error = %error, "Subscription sync failed");
                subscription.mark_error(error.to_string());
                if let Err(save_error) = self.subscriptions.save(&subscription).await {
                    warn!(
                        subscription_id = %id,
                        error = %save_error,
                        "Failed to record sync error"
                    );
                }
                Err(error)
            },
        }
    }

    /// Sync every enabled subscription concurrently
    ///
    /// A failing subscription never stops the others; failures are
    /// collected in the report. Only failing to list subscriptions is an
    /// error.
    #[instrument(skip(self))]
    pub async fn sync_all_calendars(&self) -> Result<BulkSyncReport, ApplicationError> {
        let enabled: Vec<CalendarSubscription> = self
            .subscriptions
            .list()
            .await?
            .into_iter()
            .filter(|s| s.enabled)
            .collect();

        info!(count = enabled.len(), "Syncing all enabled subscriptions");

        let results = join_all(enabled.iter().map(|s| self.sync_calendar(&s.id))).await;

        let mut report = BulkSyncReport::default();
        for (subscription, result) in enabled.into_iter().zip(results) {
            match result {
                Ok(SyncOutcome::Synced(_)) => report.succeeded.push(subscription.id),
                // Removed or disabled while the bulk run was starting
                Ok(SyncOutcome::NotFound | SyncOutcome::Disabled) => {},
                Err(failure) => {
                    error!(
                        subscription_id = %subscription.id,
                        name = %subscription.name,
                        error = %failure,
                        "Subscription failed during bulk sync"
                    );
                    report.failed.push(SyncFailure {
                        subscription_id: subscription.id,
                        name: subscription.name,
                        message: failure.to_string(),
                    });
                },
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Bulk sync finished"
        );
        Ok(report)
    }

    /// Fetch, parse and replace the subscription's events
    async fn replace_events(
        &self,
        subscription: &CalendarSubscription,
    ) -> Result<SyncStats, ApplicationError> {
        let body = self.fetcher.fetch(&subscription.url).await?;
        let records = parse_feed(&body, self.sanitizer.as_ref());

        let removed = self
            .events
            .delete_by_external_calendar(&subscription.id)
            .await?;

        let mut stats = SyncStats {
            parsed: records.len(),
            removed,
            ..SyncStats::default()
        };

        for record in &records {
            let Some(payload) = EventConverter::convert(record, subscription.id) else {
                stats.skipped += 1;
                continue;
            };
            self.event_creator.create_event(&payload).await?;
            stats.created += 1;
        }

        Ok(stats)
    }

    fn sync_lock(&self, id: &SubscriptionId) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.sync_locks.lock().entry(*id).or_default())
    }

    /// Drop the lock entry of an id that turned out not to exist
    ///
    /// The entry stays while another caller still holds or waits on it.
    fn release_lock(&self, id: &SubscriptionId, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.sync_locks.lock();
        let unshared = locks
            .get(id)
            .is_some_and(|held| Arc::ptr_eq(held, lock) && Arc::strong_count(held) == 2);
        if unshared {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.sync_locks.lock().len()
    }
}

fn subscription_not_found(id: &SubscriptionId) -> ApplicationError {
    ApplicationError::NotFound(format!("Subscription not found: {id}"))
}
