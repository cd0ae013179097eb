//! SQLite-based calendar subscription persistence

use application::{error::ApplicationError, ports::SubscriptionStore};
use async_trait::async_trait;
use domain::{CalendarSubscription, SubscriptionId, SyncStatus};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::{corrupt_column, map_sqlx_error, parse_timestamp};

/// SQLite-based subscription store
#[derive(Debug, Clone)]
pub struct SqliteSubscriptionStore {
    pool: SqlitePool,
}

impl SqliteSubscriptionStore {
    /// Create a new subscription store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, name, url, color, enabled, last_synced_at, sync_status, \
     last_sync_error, created_at, updated_at FROM calendar_subscriptions";

#[async_trait]
impl SubscriptionStore for SqliteSubscriptionStore {
    #[instrument(skip(self, subscription), fields(subscription_id = %subscription.id))]
    async fn save(&self, subscription: &CalendarSubscription) -> Result<(), ApplicationError> {
        sqlx::query(
            r"
            INSERT INTO calendar_subscriptions (
                id, name, url, color, enabled, last_synced_at, sync_status,
                last_sync_error, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                color = excluded.color,
                enabled = excluded.enabled,
                last_synced_at = excluded.last_synced_at,
                sync_status = excluded.sync_status,
                last_sync_error = excluded.last_sync_error,
                updated_at = excluded.updated_at
            ",
        )
        .bind(subscription.id.to_string())
        .bind(&subscription.name)
        .bind(&subscription.url)
        .bind(&subscription.color)
        .bind(subscription.enabled)
        .bind(subscription.last_synced_at.map(|t| t.to_rfc3339()))
        .bind(subscription.sync_status.as_str())
        .bind(&subscription.last_sync_error)
        .bind(subscription.created_at.to_rfc3339())
        .bind(subscription.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(status = %subscription.sync_status, "Subscription saved");
        Ok(())
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    async fn get(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<CalendarSubscription>, ApplicationError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<CalendarSubscription>, ApplicationError> {
        let rows: Vec<SubscriptionRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(SubscriptionRow::into_subscription)
            .collect()
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    async fn delete(&self, id: &SubscriptionId) -> Result<bool, ApplicationError> {
        let result = sqlx::query("DELETE FROM calendar_subscriptions WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(deleted = result.rows_affected(), "Subscription deleted");
        Ok(result.rows_affected() > 0)
    }
}

/// Row type for subscription queries
#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    name: String,
    url: String,
    color: String,
    enabled: bool,
    last_synced_at: Option<String>,
    sync_status: String,
    last_sync_error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl SubscriptionRow {
    fn into_subscription(self) -> Result<CalendarSubscription, ApplicationError> {
        Ok(CalendarSubscription {
            id: SubscriptionId::parse(&self.id).map_err(|e| corrupt_column("id", e))?,
            name: self.name,
            url: self.url,
            color: self.color,
            enabled: self.enabled,
            last_synced_at: self
                .last_synced_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            sync_status: self
                .sync_status
                .parse::<SyncStatus>()
                .map_err(|e| corrupt_column("sync_status", e))?,
            last_sync_error: self.last_sync_error,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::persistence::AsyncDatabase;

    async fn setup_test_db() -> (AsyncDatabase, SqliteSubscriptionStore) {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let store = SqliteSubscriptionStore::new(db.pool().clone());
        (db, store)
    }

    fn subscription(name: &str) -> CalendarSubscription {
        CalendarSubscription::new(name, "https://example.com/cal.ics", "#336699").unwrap()
    }

    #[tokio::test]
    async fn save_and_get_subscription() {
        let (_db, store) = setup_test_db().await;
        let sub = subscription("Team");

        store.save(&sub).await.unwrap();
        let loaded = store.get(&sub.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, sub.id);
        assert_eq!(loaded.name, "Team");
        assert_eq!(loaded.sync_status, SyncStatus::Pending);
        assert!(loaded.enabled);
        assert!(loaded.last_synced_at.is_none());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let (_db, store) = setup_test_db().await;
        assert!(store.get(&SubscriptionId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_updates_existing_row() {
        let (_db, store) = setup_test_db().await;
        let mut sub = subscription("Team");
        store.save(&sub).await.unwrap();

        sub.mark_syncing();
        sub.mark_error("Feed server responded with 500 Internal Server Error");
        store.save(&sub).await.unwrap();

        let loaded = store.get(&sub.id).await.unwrap().unwrap();
        assert_eq!(loaded.sync_status, SyncStatus::Error);
        assert_eq!(
            loaded.last_sync_error.as_deref(),
            Some("Feed server responded with 500 Internal Server Error")
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn success_timestamp_roundtrips() {
        let (_db, store) = setup_test_db().await;
        let mut sub = subscription("Team");
        let synced_at = Utc::now();
        sub.mark_success(synced_at);
        store.save(&sub).await.unwrap();

        let loaded = store.get(&sub.id).await.unwrap().unwrap();
        assert_eq!(
            loaded.last_synced_at.map(|t| t.timestamp_millis()),
            Some(synced_at.timestamp_millis())
        );
    }

    #[tokio::test]
    async fn list_returns_all_in_registration_order() {
        let (_db, store) = setup_test_db().await;
        let first = subscription("First");
        let mut second = subscription("Second");
        second.created_at = first.created_at + chrono::Duration::seconds(1);

        store.save(&second).await.unwrap();
        store.save(&first).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["First", "Second"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let (_db, store) = setup_test_db().await;
        let sub = subscription("Team");
        store.save(&sub).await.unwrap();

        assert!(store.delete(&sub.id).await.unwrap());
        assert!(!store.delete(&sub.id).await.unwrap());
        assert!(store.get(&sub.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_status_is_a_storage_error() {
        let (db, store) = setup_test_db().await;
        let sub = subscription("Team");
        store.save(&sub).await.unwrap();

        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE calendar_subscriptions SET sync_status = 'paused'")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            store.get(&sub.id).await,
            Err(ApplicationError::Storage(_))
        ));
    }
}
