//! Shared error mapping for the sqlx persistence layer

use application::error::ApplicationError;
use chrono::{DateTime, Utc};

/// Map a sqlx error to an application-layer error
pub fn map_sqlx_error(e: sqlx::Error) -> ApplicationError {
    match e {
        sqlx::Error::RowNotFound => {
            ApplicationError::NotFound("Database record not found".to_string())
        },
        sqlx::Error::Database(db_err) => ApplicationError::Storage(db_err.to_string()),
        other => ApplicationError::Storage(other.to_string()),
    }
}

/// Parse a stored RFC 3339 timestamp
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApplicationError::Storage(format!("Invalid stored timestamp {s:?}: {e}")))
}

/// Wrap a malformed column value
pub fn corrupt_column(column: &str, detail: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Storage(format!("Invalid value in column {column}: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            ApplicationError::NotFound(_)
        ));
    }

    #[test]
    fn other_errors_map_to_storage() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            ApplicationError::Storage(_)
        ));
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let ts = parse_timestamp("2025-01-15T09:00:00+00:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-15T09:00:00+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }
}
