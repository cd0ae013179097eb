//! Plain-text rendering for command output

use application::{BulkSyncReport, SyncOutcome};
use chrono::{DateTime, Local, Utc};
use domain::{CalendarSubscription, ScheduleEvent, hh_mm};

/// One line per subscription: id, state and name, then the URL
pub fn subscription_line(subscription: &CalendarSubscription) -> String {
    let state = if subscription.enabled {
        subscription.sync_status.as_str()
    } else {
        "disabled"
    };

    let mut line = format!(
        "{}  [{state}]  {}  {}\n    {}",
        subscription.id, subscription.name, subscription.color, subscription.url
    );
    if let Some(synced_at) = subscription.last_synced_at {
        line.push_str(&format!("\n    last synced: {}", local_timestamp(synced_at)));
    }
    if let Some(error) = &subscription.last_sync_error {
        line.push_str(&format!("\n    last error: {error}"));
    }
    line
}

/// `YYYY-MM-DD HH:MM-HH:MM  title  @ location`
pub fn event_line(event: &ScheduleEvent) -> String {
    let details = &event.details;
    let mut line = format!(
        "{}  {}-{}  {}",
        details.date.format("%Y-%m-%d"),
        details.start_time.format(hh_mm::FORMAT),
        details.end_time.format(hh_mm::FORMAT),
        details.title
    );
    if let Some(location) = &details.location {
        line.push_str(&format!("  @ {location}"));
    }
    line
}

/// Summary of a single sync call
pub fn outcome_line(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::NotFound => "Subscription not found".to_string(),
        SyncOutcome::Disabled => "Subscription is disabled, nothing synced".to_string(),
        SyncOutcome::Synced(stats) => format!(
            "Synced: {} parsed, {} imported, {} skipped, {} replaced",
            stats.parsed, stats.created, stats.skipped, stats.removed
        ),
    }
}

/// Summary of a bulk sync, one extra line per failure
pub fn report_lines(report: &BulkSyncReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Synced {} of {} subscriptions",
        report.succeeded.len(),
        report.attempted()
    )];
    lines.extend(
        report
            .failed
            .iter()
            .map(|f| format!("  failed: {} ({}): {}", f.name, f.subscription_id, f.message)),
    );
    lines
}

fn local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use application::{SyncFailure, SyncStats};
    use chrono::{NaiveDate, NaiveTime};
    use domain::{NewScheduleEvent, ScheduleEventId, SubscriptionId};

    use super::*;

    fn subscription() -> CalendarSubscription {
        CalendarSubscription::new("Team", "https://example.com/team.ics", "#336699").unwrap()
    }

    #[test]
    fn pending_subscription_line() {
        let sub = subscription();
        let line = subscription_line(&sub);
        assert!(line.starts_with(&sub.id.to_string()));
        assert!(line.contains("[pending]"));
        assert!(line.contains("https://example.com/team.ics"));
        assert!(!line.contains("last error"));
    }

    #[test]
    fn disabled_subscription_shows_disabled() {
        let mut sub = subscription();
        sub.set_enabled(false);
        assert!(subscription_line(&sub).contains("[disabled]"));
    }

    #[test]
    fn failed_subscription_shows_error() {
        let mut sub = subscription();
        sub.mark_error("Feed server responded with 404 Not Found");
        let line = subscription_line(&sub);
        assert!(line.contains("[error]"));
        assert!(line.contains("last error: Feed server responded with 404 Not Found"));
    }

    #[test]
    fn event_line_format() {
        let details = NewScheduleEvent::external(
            SubscriptionId::new(),
            "Standup",
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        )
        .with_location("Room A");
        let event = ScheduleEvent::from_new(ScheduleEventId::new(), details, Utc::now());

        assert_eq!(event_line(&event), "2025-01-15  09:00-09:30  Standup  @ Room A");
    }

    #[test]
    fn outcome_lines() {
        let stats = SyncStats {
            parsed: 3,
            created: 2,
            skipped: 1,
            removed: 4,
        };
        assert_eq!(
            outcome_line(&SyncOutcome::Synced(stats)),
            "Synced: 3 parsed, 2 imported, 1 skipped, 4 replaced"
        );
        assert!(outcome_line(&SyncOutcome::Disabled).contains("disabled"));
    }

    #[test]
    fn report_lists_failures() {
        let failed_id = SubscriptionId::new();
        let report = BulkSyncReport {
            succeeded: vec![SubscriptionId::new()],
            failed: vec![SyncFailure {
                subscription_id: failed_id,
                name: "Gone".to_string(),
                message: "Feed server responded with 404 Not Found".to_string(),
            }],
        };

        let lines = report_lines(&report);
        assert_eq!(lines[0], "Synced 1 of 2 subscriptions");
        assert_eq!(
            lines[1],
            format!("  failed: Gone ({failed_id}): Feed server responded with 404 Not Found")
        );
    }
}
