//! SQLite-based schedule event persistence
//!
//! Also acts as the event creation collaborator: it assigns identifiers and
//! stamps creation metadata for new events.

use application::{
    error::ApplicationError,
    ports::{EventCreationPort, ScheduleEventStore},
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use domain::{
    EventType, NewScheduleEvent, ScheduleEvent, ScheduleEventId, SubscriptionId, hh_mm,
};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::error::{corrupt_column, map_sqlx_error, parse_timestamp};

/// Stored calendar day format
const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-based schedule event store
#[derive(Debug, Clone)]
pub struct SqliteScheduleEventStore {
    pool: SqlitePool,
}

impl SqliteScheduleEventStore {
    /// Create a new schedule event store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, title, date, start_time, end_time, event_type, \
     is_external, external_calendar_id, external_event_id, description, location, \
     created_at, updated_at FROM schedule_events";

#[async_trait]
impl ScheduleEventStore for SqliteScheduleEventStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<ScheduleEvent>, ApplicationError> {
        let rows: Vec<EventRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY date, start_time, id"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<ScheduleEvent>, ApplicationError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE is_external = 1 AND external_calendar_id = $1 \
             ORDER BY date, start_time, id"
        ))
        .bind(subscription_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn delete(&self, id: &ScheduleEventId) -> Result<bool, ApplicationError> {
        let result = sqlx::query("DELETE FROM schedule_events WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    async fn delete_by_external_calendar(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<u64, ApplicationError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let deleted = sqlx::query(
            "DELETE FROM schedule_events WHERE is_external = 1 AND external_calendar_id = $1",
        )
        .bind(subscription_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();

        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(deleted, "Deleted imported events");
        Ok(deleted)
    }
}

#[async_trait]
impl EventCreationPort for SqliteScheduleEventStore {
    #[instrument(skip(self, event), fields(title = %event.title))]
    async fn create_event(
        &self,
        event: &NewScheduleEvent,
    ) -> Result<ScheduleEventId, ApplicationError> {
        let stored = ScheduleEvent::from_new(ScheduleEventId::new(), event.clone(), Utc::now());
        let details = &stored.details;

        sqlx::query(
            r"
            INSERT INTO schedule_events (
                id, title, date, start_time, end_time, event_type, is_external,
                external_calendar_id, external_event_id, description, location,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(stored.id.to_string())
        .bind(&details.title)
        .bind(details.date.format(DATE_FORMAT).to_string())
        .bind(details.start_time.format(hh_mm::FORMAT).to_string())
        .bind(details.end_time.format(hh_mm::FORMAT).to_string())
        .bind(details.event_type.as_str())
        .bind(details.is_external)
        .bind(details.external_calendar_id.map(|id| id.to_string()))
        .bind(&details.external_event_id)
        .bind(&details.description)
        .bind(&details.location)
        .bind(stored.created_at.to_rfc3339())
        .bind(stored.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(event_id = %stored.id, "Schedule event created");
        Ok(stored.id)
    }
}

/// Row type for schedule event queries
#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    date: String,
    start_time: String,
    end_time: String,
    event_type: String,
    is_external: bool,
    external_calendar_id: Option<String>,
    external_event_id: Option<String>,
    description: Option<String>,
    location: Option<String>,
    created_at: String,
    updated_at: String,
}

impl EventRow {
    fn into_event(self) -> Result<ScheduleEvent, ApplicationError> {
        let details = NewScheduleEvent {
            title: self.title,
            date: NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
                .map_err(|e| corrupt_column("date", e))?,
            start_time: parse_time("start_time", &self.start_time)?,
            end_time: parse_time("end_time", &self.end_time)?,
            event_type: self
                .event_type
                .parse::<EventType>()
                .map_err(|e| corrupt_column("event_type", e))?,
            is_external: self.is_external,
            external_calendar_id: self
                .external_calendar_id
                .as_deref()
                .map(SubscriptionId::parse)
                .transpose()
                .map_err(|e| corrupt_column("external_calendar_id", e))?,
            external_event_id: self.external_event_id,
            description: self.description,
            location: self.location,
        };

        Ok(ScheduleEvent {
            id: ScheduleEventId::parse(&self.id).map_err(|e| corrupt_column("id", e))?,
            details,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_time(column: &str, value: &str) -> Result<NaiveTime, ApplicationError> {
    NaiveTime::parse_from_str(value, hh_mm::FORMAT).map_err(|e| corrupt_column(column, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::AsyncDatabase;

    async fn setup_test_db() -> (AsyncDatabase, SqliteScheduleEventStore) {
        let db = AsyncDatabase::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let store = SqliteScheduleEventStore::new(db.pool().clone());
        (db, store)
    }

    fn imported(subscription_id: SubscriptionId, title: &str) -> NewScheduleEvent {
        NewScheduleEvent::external(
            subscription_id,
            title,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
    }

    fn local(title: &str) -> NewScheduleEvent {
        NewScheduleEvent {
            event_type: EventType::Focus,
            is_external: false,
            external_calendar_id: None,
            ..imported(SubscriptionId::new(), title)
        }
    }

    #[tokio::test]
    async fn create_and_list_event() {
        let (_db, store) = setup_test_db().await;
        let sub = SubscriptionId::new();
        let payload = imported(sub, "Standup")
            .with_external_event_id("uid-1@example.com")
            .with_location("Room A");

        let id = store.create_event(&payload).await.unwrap();
        let events = store.list_all().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id);
        assert_eq!(events[0].details, payload);
        assert_eq!(events[0].created_at, events[0].updated_at);
    }

    #[tokio::test]
    async fn each_creation_gets_a_fresh_id() {
        let (_db, store) = setup_test_db().await;
        let sub = SubscriptionId::new();

        let first = store.create_event(&imported(sub, "A")).await.unwrap();
        let second = store.create_event(&imported(sub, "A")).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn list_for_subscription_filters_by_owner() {
        let (_db, store) = setup_test_db().await;
        let mine = SubscriptionId::new();
        let theirs = SubscriptionId::new();

        store.create_event(&imported(mine, "Mine")).await.unwrap();
        store.create_event(&imported(theirs, "Theirs")).await.unwrap();
        store.create_event(&local("Local")).await.unwrap();

        let events = store.list_for_subscription(&mine).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].details.title, "Mine");
        assert!(events[0].is_from_subscription(&mine));
    }

    #[tokio::test]
    async fn delete_by_external_calendar_leaves_others() {
        let (_db, store) = setup_test_db().await;
        let mine = SubscriptionId::new();
        let theirs = SubscriptionId::new();

        store.create_event(&imported(mine, "One")).await.unwrap();
        store.create_event(&imported(mine, "Two")).await.unwrap();
        store.create_event(&imported(theirs, "Other")).await.unwrap();
        store.create_event(&local("Local")).await.unwrap();

        let deleted = store.delete_by_external_calendar(&mine).await.unwrap();

        assert_eq!(deleted, 2);
        let remaining: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.details.title)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&"Other".to_string()));
        assert!(remaining.contains(&"Local".to_string()));
    }

    #[tokio::test]
    async fn delete_single_event() {
        let (_db, store) = setup_test_db().await;
        let id = store.create_event(&local("Focus")).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn times_are_stored_as_hh_mm() {
        let (db, store) = setup_test_db().await;
        store
            .create_event(&imported(SubscriptionId::new(), "Standup"))
            .await
            .unwrap();

        let (date, start, end): (String, String, String) =
            sqlx::query_as("SELECT date, start_time, end_time FROM schedule_events")
                .fetch_one(db.pool())
                .await
                .unwrap();

        assert_eq!(date, "2025-01-15");
        assert_eq!(start, "09:00");
        assert_eq!(end, "09:30");
    }
}
