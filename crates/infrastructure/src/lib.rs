//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: SQLite persistence,
//! the webcal feed adapter, configuration loading and tracing setup.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, DatabaseConfig, LogFormat, SyncConfig, TelemetryAppConfig};
pub use persistence::{
    AsyncDatabase, AsyncDatabaseError, SqliteScheduleEventStore, SqliteSubscriptionStore,
};
pub use telemetry::{TelemetryError, init_tracing};
