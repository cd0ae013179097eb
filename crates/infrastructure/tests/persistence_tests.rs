//! Integration tests for persistence layer using SQLite databases
//!
//! These tests run both stores against one pool, the way the CLI wires them.

#![allow(clippy::expect_used)]

use application::ports::{EventCreationPort, ScheduleEventStore, SubscriptionStore};
use chrono::{NaiveDate, NaiveTime, Utc};
use domain::{CalendarSubscription, EventType, NewScheduleEvent, SubscriptionId, SyncStatus};
use infrastructure::{
    DatabaseConfig,
    persistence::{AsyncDatabase, SqliteScheduleEventStore, SqliteSubscriptionStore},
};

// ============================================================================
// Test Helpers
// ============================================================================

async fn create_test_db() -> AsyncDatabase {
    let db = AsyncDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

fn create_subscription(name: &str) -> CalendarSubscription {
    CalendarSubscription::new(name, "https://example.com/team.ics", "#336699")
        .expect("Failed to create subscription")
}

fn imported(subscription_id: SubscriptionId, title: &str, day: u32) -> NewScheduleEvent {
    NewScheduleEvent::external(
        subscription_id,
        title,
        NaiveDate::from_ymd_opt(2025, 1, day).expect("valid date"),
        NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"),
        NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
    )
}

// ============================================================================
// Subscription Store Tests
// ============================================================================

mod subscription_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_lifecycle_is_persisted() {
        let db = create_test_db().await;
        let store = SqliteSubscriptionStore::new(db.pool().clone());
        let mut subscription = create_subscription("Team");
        store.save(&subscription).await.expect("Failed to save");

        subscription.mark_syncing();
        store.save(&subscription).await.expect("Failed to save");
        let loaded = store
            .get(&subscription.id)
            .await
            .expect("Failed to get")
            .expect("Subscription missing");
        assert_eq!(loaded.sync_status, SyncStatus::Syncing);

        subscription.mark_success(Utc::now());
        store.save(&subscription).await.expect("Failed to save");
        let loaded = store
            .get(&subscription.id)
            .await
            .expect("Failed to get")
            .expect("Subscription missing");
        assert_eq!(loaded.sync_status, SyncStatus::Success);
        assert!(loaded.last_synced_at.is_some());
        assert!(loaded.last_sync_error.is_none());
    }

    #[tokio::test]
    async fn test_disabled_flag_is_persisted() {
        let db = create_test_db().await;
        let store = SqliteSubscriptionStore::new(db.pool().clone());
        let mut subscription = create_subscription("Team");
        subscription.set_enabled(false);
        store.save(&subscription).await.expect("Failed to save");

        let all = store.list().await.expect("Failed to list");
        assert_eq!(all.len(), 1);
        assert!(!all[0].enabled);
    }
}

// ============================================================================
// Schedule Event Store Tests
// ============================================================================

mod schedule_event_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_events_of_a_subscription_are_replaced_in_isolation() {
        let db = create_test_db().await;
        let events = SqliteScheduleEventStore::new(db.pool().clone());
        let team = SubscriptionId::new();
        let holidays = SubscriptionId::new();

        for day in 1..=3 {
            events
                .create_event(&imported(team, "Standup", day))
                .await
                .expect("Failed to create");
        }
        events
            .create_event(&imported(holidays, "New Year", 1))
            .await
            .expect("Failed to create");

        let removed = events
            .delete_by_external_calendar(&team)
            .await
            .expect("Failed to delete");
        assert_eq!(removed, 3);

        let remaining = events.list_all().await.expect("Failed to list");
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].is_from_subscription(&holidays));
    }

    #[tokio::test]
    async fn test_local_events_are_never_swept() {
        let db = create_test_db().await;
        let events = SqliteScheduleEventStore::new(db.pool().clone());
        let team = SubscriptionId::new();

        // A local event that happens to carry the subscription id
        let local = NewScheduleEvent {
            event_type: EventType::Personal,
            is_external: false,
            ..imported(team, "Dentist", 2)
        };
        events.create_event(&local).await.expect("Failed to create");
        events
            .create_event(&imported(team, "Standup", 2))
            .await
            .expect("Failed to create");

        assert_eq!(
            events
                .delete_by_external_calendar(&team)
                .await
                .expect("Failed to delete"),
            1
        );
        let remaining = events.list_all().await.expect("Failed to list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].details.title, "Dentist");
    }

    #[tokio::test]
    async fn test_list_all_is_chronological() {
        let db = create_test_db().await;
        let events = SqliteScheduleEventStore::new(db.pool().clone());
        let team = SubscriptionId::new();

        events
            .create_event(&imported(team, "Later", 20))
            .await
            .expect("Failed to create");
        events
            .create_event(&imported(team, "Sooner", 5))
            .await
            .expect("Failed to create");

        let titles: Vec<_> = events
            .list_all()
            .await
            .expect("Failed to list")
            .into_iter()
            .map(|e| e.details.title)
            .collect();
        assert_eq!(titles, ["Sooner", "Later"]);
    }
}

// ============================================================================
// File Database Tests
// ============================================================================

mod file_database_tests {
    use super::*;

    #[tokio::test]
    async fn test_data_survives_reopening() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig::file(&dir.path().join("calsync.db"));
        let subscription = create_subscription("Team");

        {
            let db = AsyncDatabase::new(&config).await.expect("Failed to open");
            db.migrate().await.expect("Failed to migrate");
            let subscriptions = SqliteSubscriptionStore::new(db.pool().clone());
            let events = SqliteScheduleEventStore::new(db.pool().clone());
            subscriptions
                .save(&subscription)
                .await
                .expect("Failed to save");
            events
                .create_event(&imported(subscription.id, "Standup", 15))
                .await
                .expect("Failed to create");
            db.pool().close().await;
        }

        let db = AsyncDatabase::new(&config).await.expect("Failed to reopen");
        db.migrate().await.expect("Failed to migrate");
        let subscriptions = SqliteSubscriptionStore::new(db.pool().clone());
        let events = SqliteScheduleEventStore::new(db.pool().clone());

        let loaded = subscriptions
            .get(&subscription.id)
            .await
            .expect("Failed to get")
            .expect("Subscription missing");
        assert_eq!(loaded.name, "Team");
        assert_eq!(
            events
                .list_for_subscription(&subscription.id)
                .await
                .expect("Failed to list")
                .len(),
            1
        );
    }
}
