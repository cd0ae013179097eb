//! Application services - Use case implementations

mod event_converter;
mod markup_sanitizer;
mod subscription_sync_service;
mod url_safety;

pub use event_converter::{DEFAULT_EVENT_DURATION, EventConverter};
pub use markup_sanitizer::MarkupSanitizer;
pub use subscription_sync_service::{
    BulkSyncReport, SubscriptionSyncService, SyncFailure, SyncOutcome, SyncStats,
};
pub use url_safety::UrlSafetyValidator;
