//! Subscription storage port
//!
//! Defines the interface for persisting calendar subscriptions.
//! Adapters in the infrastructure layer implement this port using SQLite.

use async_trait::async_trait;
use domain::{CalendarSubscription, SubscriptionId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for subscription persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or replace a subscription
    async fn save(&self, subscription: &CalendarSubscription) -> Result<(), ApplicationError>;

    /// Get a subscription by ID
    async fn get(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<CalendarSubscription>, ApplicationError>;

    /// List all subscriptions in registration order
    async fn list(&self) -> Result<Vec<CalendarSubscription>, ApplicationError>;

    /// Delete a subscription
    ///
    /// # Returns
    /// `true` if a record was removed
    async fn delete(&self, id: &SubscriptionId) -> Result<bool, ApplicationError>;
}
